use lazy_static::lazy_static;
use percent_encoding::percent_decode_str;
use regex::Regex;

/// Name of the cookie carrying the anti-forgery token, echoed back in `CSRF_HEADER`.
pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";

lazy_static! {
    // One `name=value` pair of a Cookie string; surrounding whitespace is not part of either side.
    static ref COOKIE_PAIR: Regex = Regex::new(r"^\s*([^=;\s]+)\s*=\s*(.*?)\s*$").unwrap();
}

/// Looks up `name` in a `Cookie` string (`a=1; b=2`) and returns its percent-decoded value.
/// The first matching pair wins.
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|pair| COOKIE_PAIR.captures(pair))
        .find(|caps| &caps[1] == name)
        .map(|caps| percent_decode_str(&caps[2]).decode_utf8_lossy().into_owned())
}
