use std::fmt::{Display, Write};

use crate::{Error, Result};

/// The placeholder token replaced by successive arguments.
const PLACEHOLDER: &str = "{}";

/// Replaces successive `{}` tokens in `template` with the stringified
/// arguments, in order.
///
/// Placeholders beyond the supplied arguments are passed through verbatim;
/// supplying more arguments than placeholders is an error.
///
/// # Errors
///
/// Returns [`Error::TooManyArguments`] if `args` has more elements than the
/// template has `{}` placeholders.
///
/// # Example
///
/// ```
/// use fmt_utils::format;
///
/// let message = format("{} + {} = {}", &[&1, &2, &3])?;
/// assert_eq!(message, "1 + 2 = 3");
///
/// // Leftover placeholders survive untouched.
/// assert_eq!(format("{} and {}", &[&"salt"])?, "salt and {}");
/// # Ok::<(), fmt_utils::Error>(())
/// ```
pub fn format(template: &str, args: &[&dyn Display]) -> Result<String> {
    let placeholders = template.matches(PLACEHOLDER).count();
    if args.len() > placeholders {
        return Err(Error::TooManyArguments {
            supplied: args.len(),
            placeholders,
        });
    }

    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    for arg in args {
        let position = rest
            .find(PLACEHOLDER)
            .expect("placeholder count was verified above");

        let (head, tail) = rest.split_at(position);
        output.push_str(head);

        write!(output, "{arg}").expect("writing to a String cannot fail");

        rest = tail
            .get(PLACEHOLDER.len()..)
            .expect("tail starts with a whole placeholder");
    }

    output.push_str(rest);

    Ok(output)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn substitutes_in_order() {
        let result = format("{} eats {}", &[&"cat", &"fish"]).unwrap();

        assert_eq!(result, "cat eats fish");
    }

    #[test]
    fn mixes_argument_types() {
        let result = format("{}: {} ({}%)", &[&"progress", &7_u32, &12.5_f64]).unwrap();

        assert_eq!(result, "progress: 7 (12.5%)");
    }

    #[test]
    fn no_placeholders_and_no_arguments_is_identity() {
        let result = format("plain text", &[]).unwrap();

        assert_eq!(result, "plain text");
    }

    #[test]
    fn leftover_placeholders_pass_through() {
        let result = format("{} then {} then {}", &[&1]).unwrap();

        assert_eq!(result, "1 then {} then {}");
    }

    #[test]
    fn too_many_arguments_is_an_error() {
        let result = format("only {}", &[&1, &2]);

        assert!(matches!(
            result,
            Err(Error::TooManyArguments {
                supplied: 2,
                placeholders: 1,
            })
        ));
    }

    #[test]
    fn adjacent_placeholders_work() {
        let result = format("{}{}", &[&"a", &"b"]).unwrap();

        assert_eq!(result, "ab");
    }

    #[test]
    fn empty_template_with_arguments_is_an_error() {
        let result = format("", &[&1]);

        assert!(matches!(result, Err(Error::TooManyArguments { .. })));
    }
}
