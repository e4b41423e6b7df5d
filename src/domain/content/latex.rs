use once_cell::sync::Lazy;
use regex::Regex;

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Macro names with a direct spoken-symbol equivalent.
fn symbol_for_macro(name: &str) -> Option<&'static str> {
    let symbol = match name {
        "times" => "×",
        "div" => "÷",
        "cdot" => "⋅",
        "pm" => "±",
        "mp" => "∓",
        "le" | "leq" => "≤",
        "ge" | "geq" => "≥",
        "ne" | "neq" => "≠",
        "approx" => "≈",
        "equiv" => "≡",
        "infty" => "∞",
        "pi" => "π",
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" => "ε",
        "theta" => "θ",
        "lambda" => "λ",
        "mu" => "μ",
        "sigma" => "σ",
        "phi" => "φ",
        "omega" => "ω",
        "Delta" => "Δ",
        "Sigma" => "Σ",
        "Omega" => "Ω",
        "sum" => "∑",
        "prod" => "∏",
        "int" => "∫",
        "sqrt" => "√",
        "to" | "rightarrow" => "→",
        "leftarrow" => "←",
        "Rightarrow" => "⇒",
        "degree" => "°",
        "circ" => "∘",
        "cup" => "∪",
        "cap" => "∩",
        "subset" => "⊂",
        "in" => "∈",
        "forall" => "∀",
        "exists" => "∃",
        "quad" | "qquad" => " ",
        _ => return None,
    };
    Some(symbol)
}

fn superscript_char(c: char) -> Option<char> {
    let mapped = match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' => '⁻',
        'n' => 'ⁿ',
        'i' => 'ⁱ',
        _ => return None,
    };
    Some(mapped)
}

fn subscript_char(c: char) -> Option<char> {
    let mapped = match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' => '₋',
        _ => return None,
    };
    Some(mapped)
}

/// Renders a LaTeX-like formula as plain spoken text: known macros become
/// their unicode symbols, fractions become `a/b`, exponents and indices use
/// unicode super/subscripts where possible, and grouping braces disappear.
///
/// The renderer is intentionally forgiving: unknown macros keep their bare
/// name and structural noise is dropped, so malformed formulas still yield
/// best-effort text instead of an error.
pub fn latex_to_text(latex: &str) -> String {
    let chars: Vec<char> = latex.chars().collect();
    let mut index = 0;
    let rendered = render_sequence(&chars, &mut index, false);
    RE_WHITESPACE.replace_all(&rendered, " ").trim().to_string()
}

/// Renders characters until the end of input or, inside a group, the
/// matching closing brace.
fn render_sequence(chars: &[char], index: &mut usize, in_group: bool) -> String {
    let mut output = String::new();

    while *index < chars.len() {
        let c = chars[*index];
        match c {
            '}' if in_group => {
                *index += 1;
                return output;
            }
            '{' => {
                *index += 1;
                output.push_str(&render_sequence(chars, index, true));
            }
            '\\' => {
                *index += 1;
                output.push_str(&render_macro(chars, index));
            }
            '^' => {
                *index += 1;
                let atom = render_atom(chars, index);
                output.push_str(&render_script(&atom, '^', superscript_char));
            }
            '_' => {
                *index += 1;
                let atom = render_atom(chars, index);
                output.push_str(&render_script(&atom, '_', subscript_char));
            }
            '~' => {
                *index += 1;
                output.push(' ');
            }
            '$' => {
                *index += 1;
            }
            _ => {
                *index += 1;
                output.push(c);
            }
        }
    }

    output
}

/// Renders one macro invocation; `index` points just past the backslash.
fn render_macro(chars: &[char], index: &mut usize) -> String {
    // An escaped non-letter is just that literal character.
    if *index < chars.len() && !chars[*index].is_ascii_alphabetic() {
        let literal = chars[*index];
        *index += 1;
        return literal.to_string();
    }

    let mut name = String::new();
    while *index < chars.len() && chars[*index].is_ascii_alphabetic() {
        name.push(chars[*index]);
        *index += 1;
    }

    match name.as_str() {
        "frac" => {
            let numerator = render_atom(chars, index);
            let denominator = render_atom(chars, index);
            format!("{}/{}", numerator, denominator)
        }
        "sqrt" => {
            skip_optional_argument(chars, index);
            let radicand = render_atom(chars, index);
            format!("√{}", radicand)
        }
        _ => match symbol_for_macro(&name) {
            Some(symbol) => symbol.to_string(),
            // Unknown macros (\sin, \log, ...) read naturally as their name.
            None => name,
        },
    }
}

/// Renders the next atom: a braced group, a macro, or a single character.
fn render_atom(chars: &[char], index: &mut usize) -> String {
    while *index < chars.len() && chars[*index].is_whitespace() {
        *index += 1;
    }
    if *index >= chars.len() {
        return String::new();
    }

    match chars[*index] {
        '{' => {
            *index += 1;
            render_sequence(chars, index, true)
        }
        '\\' => {
            *index += 1;
            render_macro(chars, index)
        }
        single => {
            *index += 1;
            single.to_string()
        }
    }
}

/// Maps a super/subscript atom to unicode script characters when every
/// character is mappable, falling back to the literal marker otherwise.
fn render_script(atom: &str, marker: char, map: fn(char) -> Option<char>) -> String {
    let mapped: Option<String> = atom.chars().map(map).collect();
    match mapped {
        Some(script) if !script.is_empty() => script,
        _ => format!("{}{}", marker, atom),
    }
}

fn skip_optional_argument(chars: &[char], index: &mut usize) {
    if *index < chars.len() && chars[*index] == '[' {
        while *index < chars.len() && chars[*index] != ']' {
            *index += 1;
        }
        if *index < chars.len() {
            *index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fraction_renders_as_division() {
        assert_eq!(latex_to_text("\\frac{2}{3}"), "2/3");
        assert_eq!(latex_to_text("\\frac{x + 1}{y}"), "x + 1/y");
    }

    #[test]
    fn test_square_root() {
        assert_eq!(latex_to_text("\\sqrt{16}"), "√16");
        assert_eq!(latex_to_text("\\sqrt[3]{8}"), "√8");
    }

    #[test]
    fn test_operator_symbols() {
        assert_eq!(latex_to_text("2 \\times 3 = 6"), "2 × 3 = 6");
        assert_eq!(latex_to_text("10 \\div 2"), "10 ÷ 2");
        assert_eq!(latex_to_text("a \\ne b"), "a ≠ b");
    }

    #[test]
    fn test_greek_letters() {
        assert_eq!(latex_to_text("\\alpha + \\beta"), "α + β");
        assert_eq!(latex_to_text("\\pi r^2"), "π r²");
    }

    #[test]
    fn test_superscripts_use_unicode_digits() {
        assert_eq!(latex_to_text("x^2 + y^2"), "x² + y²");
        assert_eq!(latex_to_text("2^{10}"), "2¹⁰");
        assert_eq!(latex_to_text("e^x"), "e^x");
    }

    #[test]
    fn test_subscripts_use_unicode_digits() {
        assert_eq!(latex_to_text("x_1 + x_2"), "x₁ + x₂");
        assert_eq!(latex_to_text("a_n"), "a_n");
    }

    #[test]
    fn test_braces_are_stripped() {
        assert_eq!(latex_to_text("{a} + {b}"), "a + b");
    }

    #[test]
    fn test_unknown_macro_keeps_its_name() {
        assert_eq!(latex_to_text("\\sin x"), "sin x");
    }

    #[test]
    fn test_escaped_literal() {
        assert_eq!(latex_to_text("50\\%"), "50%");
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        assert_eq!(latex_to_text("  1 \\quad +   2 "), "1 + 2");
    }

    #[test]
    fn test_empty_and_malformed_input() {
        assert_eq!(latex_to_text(""), "");
        assert_eq!(latex_to_text("\\frac{1}"), "1/");
        assert_eq!(latex_to_text("{unclosed"), "unclosed");
    }
}
