//! Page chrome: header, search hero and footer.

use std::fmt;

/// Site name shown in the header
pub const BRAND: &str = "FoodWagen";

/// Top bar: brand, navigation and the "Add Meal" action
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Header;

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {BRAND} ===            Featured            [ Add Meal ]")
    }
}

/// Banner with the search box
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hero<'a> {
    /// Current search box text
    pub search_term: &'a str,
    /// A search is running
    pub searching: bool,
    /// The search button is disabled
    pub disabled: bool,
}

impl fmt::Display for Hero<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Are you starving?")?;
        writeln!(f, "Within a few clicks, find meals that are accessible near you")?;
        let term = if self.search_term.is_empty() {
            "What do you like to eat today?"
        } else {
            self.search_term
        };
        let button = match (self.searching, self.disabled) {
            (true, _) => "Searching...",
            (false, true) => "(Find Meal)",
            (false, false) => "Find Meal",
        };
        writeln!(f, "[ {term} ]  [ {button} ]")
    }
}

/// Link columns and the copyright line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Footer;

const FOOTER_COLUMNS: [(&str, &[&str]); 3] = [
    ("Company", &["About us", "Team", "Careers", "Blog"]),
    ("Contact", &["Help & Support", "Partner with us", "Ride with us"]),
    (
        "Legal",
        &[
            "Terms & Conditions",
            "Refund & Cancellation",
            "Privacy Policy",
            "Cookie Policy",
        ],
    ),
];

impl fmt::Display for Footer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (title, links) in FOOTER_COLUMNS {
            writeln!(f, "{title}: {}", links.join(" · "))?;
        }
        write!(f, "All rights Reserved © {BRAND}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lists_brand_and_actions() {
        let text = Header.to_string();
        assert!(text.contains("FoodWagen"));
        assert!(text.contains("Featured"));
        assert!(text.contains("Add Meal"));
    }

    #[test]
    fn hero_button_states() {
        let idle = Hero {
            search_term: "",
            searching: false,
            disabled: false,
        };
        assert!(idle.to_string().contains("[ What do you like to eat today? ]  [ Find Meal ]"));

        let busy = Hero {
            search_term: "pizza",
            searching: true,
            disabled: true,
        };
        assert!(busy.to_string().contains("[ pizza ]  [ Searching... ]"));
    }

    #[test]
    fn footer_has_columns() {
        let text = Footer.to_string();
        assert!(text.contains("Company: About us"));
        assert!(text.ends_with("All rights Reserved © FoodWagen"));
    }
}
