//! Utility functions and helpers

use rand::Rng;

/// Insert a separator every three digits of an unsigned digit string
pub fn group_thousands(digits: &str, separator: &str) -> String {
    let len = digits.chars().count();
    let mut result = String::with_capacity(digits.len() + len / 3 * separator.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push_str(separator);
        }
        result.push(c);
    }
    result
}

/// Currency formatting rules
#[derive(Debug, Clone, PartialEq)]
pub struct MoneyFormat {
    pub symbol: String,
    /// Symbol goes before the sign and digits when true
    pub symbol_before: bool,
    pub decimal_places: u32,
    pub thousands_separator: String,
    pub decimal_separator: String,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            symbol_before: true,
            decimal_places: 2,
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
        }
    }
}

impl MoneyFormat {
    /// Format an amount without the currency symbol, e.g. `-1,234.50`
    pub fn amount(&self, value: f64) -> String {
        let places = self.decimal_places as usize;
        let scaled = value.abs() * 10f64.powi(self.decimal_places as i32);
        // Ties round away from zero, so 2.625 shows as 2.63.
        let units = if scaled - scaled.floor() >= 0.5 {
            scaled.floor() + 1.0
        } else {
            scaled.floor()
        };
        let digits = format!("{:0>width$.0}", units, width = places + 1);
        let (int_part, frac_part) = digits.split_at(digits.len() - places);
        let sign = if value < 0.0 && units > 0.0 { "-" } else { "" };

        let mut out = String::new();
        out.push_str(sign);
        out.push_str(&group_thousands(int_part, &self.thousands_separator));
        if places > 0 {
            out.push_str(&self.decimal_separator);
            out.push_str(frac_part);
        }
        out
    }

    /// Format an amount with the currency symbol, e.g. `$1,234.50`
    pub fn format(&self, value: f64) -> String {
        if self.symbol_before {
            format!("{}{}", self.symbol, self.amount(value))
        } else {
            format!("{} {}", self.amount(value), self.symbol)
        }
    }
}

/// Escape text for safe inclusion in HTML
pub fn escape_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Generate a random 128-bit session token as lowercase hex
pub fn generate_session_token() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
