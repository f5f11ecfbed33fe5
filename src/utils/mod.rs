mod token;

pub use token::{Claims, TokenService};

/// A plan grants access only when it is present and is not the literal
/// string "null" in any case.
pub fn plan_is_entitled(plan: Option<&str>) -> bool {
    match plan.map(str::trim) {
        None | Some("") => false,
        Some(plan) => !plan.eq_ignore_ascii_case("null"),
    }
}
