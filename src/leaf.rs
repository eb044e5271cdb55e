//! Leaf synthesizer: primitive schema → faker-expression text.
//!
//! Output is a deterministic expression fragment; the randomness executes
//! inside the generated artifact, never here. Constraint handling is
//! best-effort: enums beat formats beat patterns beat plain defaults.

use serde_json::Value;

use crate::schema::{Primitive, PrimitiveKind};

/// Default generated-string length when the schema gives no bounds.
const DEFAULT_STRING_LENGTH: u32 = 20;

/// Expression text for one primitive node.
pub fn synthesize(prim: &Primitive) -> String {
    if !prim.enum_values.is_empty() {
        return enum_expression(&prim.enum_values);
    }

    match prim.kind {
        PrimitiveKind::String => string_expression(prim),
        PrimitiveKind::Integer => number_expression("faker.number.int", prim),
        PrimitiveKind::Number => number_expression("faker.number.float", prim),
        PrimitiveKind::Boolean => "faker.datatype.boolean()".to_string(),
        PrimitiveKind::Null => "null".to_string(),
    }
}

fn enum_expression(values: &[Value]) -> String {
    let literals: Vec<String> = values.iter().map(js_literal).collect();
    format!("faker.helpers.arrayElement([{}])", literals.join(", "))
}

fn string_expression(prim: &Primitive) -> String {
    if let Some(format) = prim.format.as_deref() {
        if let Some(expr) = format_expression(format) {
            return expr.to_string();
        }
    }
    if let Some(pattern) = &prim.pattern {
        return format!("faker.helpers.fromRegExp({})", js_string(pattern));
    }
    match (prim.min_length, prim.max_length) {
        (None, None) => format!("faker.string.alpha({DEFAULT_STRING_LENGTH})"),
        (min, max) => {
            let min = min.unwrap_or(0);
            let max = max.unwrap_or(min.max(DEFAULT_STRING_LENGTH));
            format!("faker.string.alpha({{ length: {{ min: {min}, max: {max} }} }})")
        }
    }
}

fn format_expression(format: &str) -> Option<&'static str> {
    let expr = match format {
        "email" => "faker.internet.email()",
        "uri" | "url" => "faker.internet.url()",
        "uuid" => "faker.string.uuid()",
        "hostname" => "faker.internet.domainName()",
        "ipv4" => "faker.internet.ipv4()",
        "ipv6" => "faker.internet.ipv6()",
        "password" => "faker.internet.password()",
        "date" => "faker.date.past().toISOString().split('T')[0]",
        "date-time" => "faker.date.past().toISOString()",
        "binary" => "new Blob()",
        _ => return None,
    };
    Some(expr)
}

fn number_expression(helper: &str, prim: &Primitive) -> String {
    match (prim.minimum, prim.maximum) {
        (None, None) => format!("{helper}()"),
        (min, max) => {
            let mut bounds = Vec::new();
            if let Some(min) = min {
                bounds.push(format!("min: {}", js_number(min)));
            }
            if let Some(max) = max {
                bounds.push(format!("max: {}", js_number(max)));
            }
            format!("{helper}({{ {} }})", bounds.join(", "))
        }
    }
}

// --------------------------- JS literal helpers ---------------------------- //

fn js_literal(value: &Value) -> String {
    match value {
        Value::String(s) => js_string(s),
        // Everything else serializes identically in JSON and JS.
        other => other.to_string(),
    }
}

fn js_string(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

fn js_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prim(kind: PrimitiveKind) -> Primitive {
        Primitive {
            kind,
            format: None,
            enum_values: vec![],
            pattern: None,
            minimum: None,
            maximum: None,
            min_length: None,
            max_length: None,
        }
    }

    #[test]
    fn plain_string_uses_default_length() {
        assert_eq!(synthesize(&prim(PrimitiveKind::String)), "faker.string.alpha(20)");
    }

    #[test]
    fn string_formats_map_to_faker_helpers() {
        let mut p = prim(PrimitiveKind::String);
        p.format = Some("email".to_string());
        assert_eq!(synthesize(&p), "faker.internet.email()");
        p.format = Some("uuid".to_string());
        assert_eq!(synthesize(&p), "faker.string.uuid()");
        // Unknown format falls through to the plain default.
        p.format = Some("no-such-format".to_string());
        assert_eq!(synthesize(&p), "faker.string.alpha(20)");
    }

    #[test]
    fn length_bounds_become_length_options() {
        let mut p = prim(PrimitiveKind::String);
        p.min_length = Some(2);
        p.max_length = Some(8);
        assert_eq!(
            synthesize(&p),
            "faker.string.alpha({ length: { min: 2, max: 8 } })"
        );
    }

    #[test]
    fn pattern_uses_from_reg_exp() {
        let mut p = prim(PrimitiveKind::String);
        p.pattern = Some("^[a-z]{3}$".to_string());
        assert_eq!(synthesize(&p), "faker.helpers.fromRegExp('^[a-z]{3}$')");
    }

    #[test]
    fn numbers_carry_bounds() {
        let mut p = prim(PrimitiveKind::Integer);
        assert_eq!(synthesize(&p), "faker.number.int()");
        p.minimum = Some(1.0);
        p.maximum = Some(10.0);
        assert_eq!(synthesize(&p), "faker.number.int({ min: 1, max: 10 })");

        let mut f = prim(PrimitiveKind::Number);
        f.maximum = Some(2.5);
        assert_eq!(synthesize(&f), "faker.number.float({ max: 2.5 })");
    }

    #[test]
    fn enums_beat_everything_else() {
        let mut p = prim(PrimitiveKind::String);
        p.format = Some("email".to_string());
        p.enum_values = vec![json!("on"), json!("off")];
        assert_eq!(synthesize(&p), "faker.helpers.arrayElement(['on', 'off'])");

        let mut n = prim(PrimitiveKind::Integer);
        n.enum_values = vec![json!(1), json!(2)];
        assert_eq!(synthesize(&n), "faker.helpers.arrayElement([1, 2])");
    }

    #[test]
    fn booleans_and_null() {
        assert_eq!(synthesize(&prim(PrimitiveKind::Boolean)), "faker.datatype.boolean()");
        assert_eq!(synthesize(&prim(PrimitiveKind::Null)), "null");
    }
}
