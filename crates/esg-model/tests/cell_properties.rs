//! Property tests for cell parsing and display.

use esg_model::{CellValue, format_numeric, parse_number};
use proptest::prelude::*;

proptest! {
    #[test]
    fn formatted_numbers_parse_back(value in -1.0e12f64..1.0e12f64) {
        let text = format_numeric(value);
        prop_assert_eq!(parse_number(&text), Some(value));
    }

    #[test]
    fn nc_never_reads_as_number(padding in "[ \t]{0,3}") {
        let text = format!("{padding}NC{padding}");
        prop_assert_eq!(CellValue::text(text).as_number(), None);
    }
}
