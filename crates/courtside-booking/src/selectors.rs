//! Element locators for the reservation site
//!
//! The results page has one table per date, `id`'d by the `YYYY-MM-DD`
//! string. Each row is labelled by a `<strong>` time inside a cell, and
//! bookable cells carry the `status2` class around an anchor. Booking pages
//! use fixed input ids and buttons identified by their `value` label.

use courtside_core::{Button, Locator};

/// CSS class marking an available slot cell
pub const AVAILABLE_CLASS: &str = "status2";

/// Input ids on the player and payment forms
pub mod field {
    pub const NUM_PLAYERS: &str = "num_players_2";
    pub const PERMIT_NUMBER: &str = "permit-number1";
    pub const CENTRAL_PARK_NAME: &str = "name1";
    pub const EXISTING_PERMIT: &str = "single_play_exist_1";
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const ADDRESS: &str = "address";
    pub const CITY: &str = "city";
    pub const ZIP: &str = "zip";
    pub const PHONE: &str = "phone";
    pub const CC_NUMBER: &str = "cc_number";
    pub const EXP_MONTH: &str = "expdate_month";
    pub const EXP_YEAR: &str = "expdate_year";
    pub const CVV: &str = "cvv2_number";

    /// Every field that carries player or payment data
    pub const PERSONAL: [&str; 13] = [
        PERMIT_NUMBER,
        CENTRAL_PARK_NAME,
        EXISTING_PERMIT,
        NAME,
        EMAIL,
        ADDRESS,
        CITY,
        ZIP,
        PHONE,
        CC_NUMBER,
        EXP_MONTH,
        EXP_YEAR,
        CVV,
    ];
}

/// The results table for a date
pub fn date_table(date: &str) -> Locator {
    Locator::id(date)
}

fn time_rows_expr(date: &str) -> String {
    format!("//*[@id={}]//tr[td/strong]", xpath_literal(date))
}

/// Rows of a date's table that carry a time label
pub fn time_rows(date: &str) -> Locator {
    Locator::xpath(time_rows_expr(date))
}

/// The time label of each labelled row, one per row, in row order
pub fn time_row_labels(date: &str) -> Locator {
    Locator::xpath(format!("{}/td[strong][1]/strong[1]", time_rows_expr(date)))
}

/// Anchors inside available cells of the `row_index`-th (0-based) labelled row
pub fn available_slot_links(date: &str, row_index: usize) -> Locator {
    Locator::xpath(format!(
        "({})[{}]//*[contains(concat(' ', normalize-space(@class), ' '), ' {} ')]//a",
        time_rows_expr(date),
        row_index + 1,
        AVAILABLE_CLASS
    ))
}

/// A form input by id
pub fn input(id: &str) -> Locator {
    Locator::css(format!("input[id=\"{}\"]", id))
}

/// A submit control by its visible label
pub fn button(button: Button) -> Locator {
    Locator::css(format!("input[value=\"{}\"]", button.label()))
}

/// Quote a string as an XPath literal, whatever quotes it contains
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xpath_literal_quoting() {
        assert_eq!(xpath_literal("12:00 p.m."), "'12:00 p.m.'");
        assert_eq!(xpath_literal("o'clock"), "\"o'clock\"");
        assert_eq!(
            xpath_literal("it's \"noon\""),
            "concat('it', \"'\", 's \"noon\"')"
        );
    }

    #[test]
    fn test_slot_links_index_rows_from_one() {
        let Locator::XPath(expr) = available_slot_links("2024-05-01", 0) else {
            panic!("expected xpath");
        };
        assert!(expr.starts_with("(//*[@id='2024-05-01']//tr[td/strong])[1]"));
        assert!(expr.contains("' status2 '"));
    }

    #[test]
    fn test_input_and_button_locators() {
        assert_eq!(input(field::EMAIL), Locator::Css("input[id=\"email\"]".to_string()));
        assert_eq!(
            button(Button::MakeReservation),
            Locator::Css("input[value=\"Make Reservation\"]".to_string())
        );
    }
}
