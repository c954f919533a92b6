//! Compile-time source configuration: job-board profiles for discovery
//! and the selector profile for the outreach surface. Core logic never
//! hard-codes a selector; it reads them from here.

use internscout_common::SourceBoard;

/// Per-board discovery configuration.
pub struct BoardProfile {
    pub board: SourceBoard,
    pub search_url: &'static str,
    pub card_selector: &'static str,
    pub company_selector: &'static str,
    pub description_selector: &'static str,
    /// Bounded prefix of result cards inspected per board.
    pub card_limit: usize,
}

/// Discovery sources in iteration order.
pub fn job_boards() -> Vec<BoardProfile> {
    vec![
        BoardProfile {
            board: SourceBoard::Seek,
            search_url: "https://www.seek.com.au/ai-internship-jobs/in-Sydney-NSW?daterange=31",
            card_selector: "article[data-automation=\"normalJob\"]",
            company_selector: "a[data-automation=\"jobCompany\"]",
            description_selector: "div[data-automation=\"jobAdDetails\"]",
            card_limit: 50,
        },
        BoardProfile {
            board: SourceBoard::Indeed,
            search_url:
                "https://au.indeed.com/jobs?q=ai+internship+OR+machine+learning+internship&l=Sydney+NSW",
            card_selector: "div.job_seen_beacon",
            company_selector: "span.companyName",
            description_selector: "div#jobDescriptionText",
            card_limit: 50,
        },
        BoardProfile {
            board: SourceBoard::Jora,
            search_url: "https://au.jora.com/jobs?q=ai+internship&l=Sydney+NSW",
            card_selector: "div.job-card",
            company_selector: "div.company",
            description_selector: "div.job-description",
            card_limit: 50,
        },
    ]
}

/// Selector profile for the professional-network surface and the web
/// search engine used for verification queries.
pub struct SurfaceProfile {
    pub login_url: &'static str,
    pub people_search_url: &'static str,
    pub search_box: &'static str,
    pub result_card: &'static str,
    pub result_name: &'static str,
    pub connect_button: &'static str,
    pub add_note_button: &'static str,
    pub note_field: &'static str,
    pub send_button: &'static str,
    pub send_fallback_button: &'static str,
    pub message_button: &'static str,
    pub message_field: &'static str,
    /// Substring identifying personal profile URLs on the network.
    pub profile_host: &'static str,
    pub search_engine_url: &'static str,
    pub search_result_link: &'static str,
}

pub fn surface() -> SurfaceProfile {
    SurfaceProfile {
        login_url: "https://www.linkedin.com",
        people_search_url: "https://www.linkedin.com/search/results/people/",
        search_box: "input[placeholder=\"Search\"]",
        result_card: "li.reusable-search__result-container",
        result_name: "span[dir=\"ltr\"] span[aria-hidden=\"true\"]",
        connect_button: "button[aria-label*=\"Invite\"]",
        add_note_button: "button[aria-label=\"Add a note\"]",
        note_field: "textarea[name=\"message\"]",
        send_button: "button[aria-label=\"Send now\"]",
        send_fallback_button: "button[aria-label=\"Send invitation\"]",
        message_button: "button[aria-label*=\"Message\"]",
        message_field: "div.msg-form__contenteditable",
        profile_host: "linkedin.com/in/",
        search_engine_url: "https://www.google.com/search?q=",
        search_result_link: "div.g a",
    }
}

/// Build a search-engine URL for a free-text query.
pub fn web_search_url(query: &str) -> String {
    format!("{}{}", surface().search_engine_url, query.replace(' ', "+"))
}

/// Hosts never accepted as a company's own website: job boards, social
/// networks, and the search engine itself.
pub const EXCLUDED_HOSTS: &[&str] = &[
    "linkedin",
    "indeed",
    "seek",
    "jora",
    "google",
    "facebook",
    "twitter",
    "instagram",
    "youtube",
    "wikipedia",
];

/// Page-title markers that indicate a dead or broken candidate site.
pub const ERROR_TITLE_MARKERS: &[&str] = &["404", "not found", "error"];

/// Link keywords that identify an internal team/about page.
pub const TEAM_PAGE_KEYWORDS: &[&str] = &[
    "team",
    "about",
    "people",
    "leadership",
    "staff",
    "our-team",
    "about-us",
];

/// Professional-title words accepted near a candidate name.
pub const TITLE_KEYWORDS: &[&str] = &[
    "CEO", "CTO", "Director", "Manager", "Lead", "Engineer", "Developer", "Designer", "Analyst",
];

/// Words on a careers/landing page that signal an internship program.
pub const INTERNSHIP_KEYWORDS: &[&str] = &["intern", "graduate", "trainee", "entry level"];
