//! Integration tests for interpreter
//!
//! Source text through the compiler and the executor, checked against the
//! values the evaluated language defines for each expression.

use core_types::{JsError, Value};
use interpreter::{evaluate_blocking, NativeHandler};

/// Environment with the few host functions the expressions below use.
fn env() -> Value {
    let math = Value::object([(
        "max",
        Value::function("max", |_this, args| {
            Ok(Value::Number(
                args.iter()
                    .map(Value::to_number)
                    .fold(f64::NEG_INFINITY, f64::max),
            ))
        }),
    )]);
    let object = Value::object([(
        "keys",
        Value::function("keys", |_this, args| match args.first() {
            Some(Value::Object(obj)) => Ok(Value::array(
                obj.borrow().properties.keys().map(Value::from).collect(),
            )),
            _ => Ok(Value::array(vec![])),
        }),
    )]);
    let string = Value::object([("raw", Value::function("raw", string_raw))]);
    let env = Value::object([("Math", math), ("Object", object), ("String", string)]);
    env.set_property(
        "setV",
        Value::function("setV", |this, args| {
            this.set_property("v", args.first().cloned().unwrap_or(Value::Undefined))?;
            Ok(Value::Undefined)
        }),
    )
    .unwrap();
    env.set_property("self", env.clone()).unwrap();
    env
}

fn string_raw(_this: &Value, args: &[Value]) -> Result<Value, JsError> {
    let strings = args.first().cloned().unwrap_or(Value::Undefined);
    let raw = strings.get_property("raw")?;
    let len = raw.get_property("length")?.to_number() as usize;
    let mut out = String::new();
    for i in 0..len {
        out.push_str(&raw.get_property(&i.to_string())?.to_string());
        if i + 1 < len {
            if let Some(value) = args.get(i + 1) {
                out.push_str(&value.to_string());
            }
        }
    }
    Ok(Value::String(out))
}

fn eval(source: &str) -> Value {
    evaluate_blocking(source, &env(), &NativeHandler)
        .unwrap_or_else(|e| panic!("{}: {}", source, e))
}

fn check(cases: &[(&str, Value)]) {
    for (source, expected) in cases {
        assert_eq!(&eval(source), expected, "source: {}", source);
    }
}

fn num(n: f64) -> Value {
    Value::Number(n)
}

fn text(s: &str) -> Value {
    Value::from(s)
}

#[test]
fn test_literals() {
    check(&[
        ("null", Value::Null),
        ("true", Value::Boolean(true)),
        ("false", Value::Boolean(false)),
        ("undefined", Value::Undefined),
        ("Infinity", num(f64::INFINITY)),
        ("'str'", text("str")),
        ("0x1F", num(31.0)),
        ("1e3", num(1000.0)),
    ]);
    assert!(eval("NaN").to_number().is_nan());
}

#[test]
fn test_arithmetic_and_precedence() {
    check(&[
        ("-+-Infinity", num(f64::INFINITY)),
        ("'a' + 1", text("a1")),
        ("undefined == null", Value::Boolean(true)),
        ("2 + 3 * 4 - 5", num(9.0)),
        ("(2 + 3) * 4 - -(-5)", num(15.0)),
        ("-(2 + 3) * 4 - -(-5)", num(-25.0)),
        ("-(2 + 3) * 4 ** 2", num(-80.0)),
        ("-2 << 3 * 2 + 4", num(-2048.0)),
        ("-(2 << 3) * 2 + 4", num(-28.0)),
        ("-(2 << 3) * (4 / 2)", num(-32.0)),
        ("2 ** 3 ** 2", num(512.0)),
        ("true + 2", num(3.0)),
        ("\"a\" + \"b\"", text("ab")),
        ("0xFF & 0xF0 | 0x3 <= 0x100 ^ 1", num(240.0)),
        ("1.3 % 1 < 1 && \"aab\" > \"aaa\"", Value::Boolean(true)),
        ("2 < 3 + 4 * 5 / 6 ** 2", Value::Boolean(true)),
        ("123456 >> 4", num(7716.0)),
        ("-1 >>> 8", num(16777215.0)),
    ]);
    assert!(eval("'a' - 1").to_number().is_nan());
    assert_eq!(eval("-[]"), num(0.0));
}

#[test]
fn test_comparison_and_membership() {
    check(&[
        ("'length' in []", Value::Boolean(true)),
        ("({}) == ({})", Value::Boolean(false)),
        ("({}) === ({})", Value::Boolean(false)),
        ("1+2 === 3", Value::Boolean(true)),
        ("1+2 !== 3", Value::Boolean(false)),
        ("[] >= {}", Value::Boolean(false)),
        ("[] != {}", Value::Boolean(true)),
        ("'1' == 1", Value::Boolean(true)),
        ("'1' === 1", Value::Boolean(false)),
    ]);
}

#[test]
fn test_member_access_and_calls() {
    check(&[
        ("-Math.max(2, 4.5, 3)", num(-4.5)),
        ("Math.max(0.123*2, 0.1)", num(0.246)),
        ("\"abc\"[1]", text("b")),
        ("\"abc\".length", num(3.0)),
        ("/a/i.test(`ABC`)", Value::Boolean(true)),
        ("a=[2.1, 3.4, -5]; Math.max(...a)", num(3.4)),
        ("Math.max(...[2.1, 3.4, -5])", num(3.4)),
    ]);
}

#[test]
fn test_templates() {
    check(&[
        ("`ABC`", text("ABC")),
        ("`ABC ${2+3} DEF`", text("ABC 5 DEF")),
        ("`ABC ${2+3}${6} DEF`", text("ABC 56 DEF")),
        ("String.raw `ABC`", text("ABC")),
        ("String.raw `ABC ${2+3} DEF`", text("ABC 5 DEF")),
        ("String.raw `ABC ${2+3}${6} DEF`", text("ABC 56 DEF")),
        (r"String.raw `A\`B\nC`", text(r"A\`B\nC")),
        (r#"String.raw `${"A"} \` ${"B"} \n ${"C"}`"#, text(r"A \` B \n C")),
    ]);
}

#[test]
fn test_conditionals() {
    check(&[
        ("0 ? \"y\" : \"n\"", text("n")),
        ("1 ? \"y\" : \"n\"", text("y")),
        ("0 ? \"zero\" : 1 ? \"one\" : \"other\"", text("one")),
        ("1 ? 2 ? 3 : 4 : 5", num(3.0)),
        ("1 ? 0 ? 3 : 4 : 5", num(4.0)),
        ("true ? 0 || 1 && 1 ? 0 ? 3 : 4 : 5 || 3 : \".\"", num(4.0)),
        ("false ? 0 || 1 && 1 ? 0 ? 3 : -+4 : !5 + -6 || ~3 : \".\"", text(".")),
    ]);
}

#[test]
fn test_logical_operators() {
    check(&[
        ("null ?? 0 ?? \"y\"", num(0.0)),
        ("0 ?? null ?? \"y\"", num(0.0)),
        ("\"y\" ?? null ?? 0", text("y")),
        ("0 && 1 || 2 && 3", num(3.0)),
        ("0 && 1 || false && 3", Value::Boolean(false)),
        ("0 || 1 && 2 || 3", num(2.0)),
        ("0 || 1 && false || 3", num(3.0)),
        ("true ? 0 || 1 && false || 3 : \".\"", num(3.0)),
    ]);
}

#[test]
fn test_short_circuit_side_effects() {
    check(&[
        ("null ?? setV(true); v", Value::Boolean(true)),
        ("0 ?? setV(true); v", Value::Undefined),
        ("null || setV(true); v", Value::Boolean(true)),
        ("0 || setV(true); v", Value::Boolean(true)),
        ("null && setV(true); v", Value::Undefined),
        ("0 && setV(true); v", Value::Undefined),
    ]);
}

#[test]
fn test_statement_sequences() {
    check(&[
        ("1, 0 ? \"y\" : \"n\"", text("n")),
        ("0 ? \"y\" : \"n\", 1", num(1.0)),
        ("1; 0 ? \"y\" : \"n\"", text("n")),
        ("0 ? \"y\" : \"n\"; 1", num(1.0)),
        ("1\n2", num(2.0)),
        ("\"a\"\n\"b\"\n", text("b")),
        ("a=1, b=2; a+b", num(3.0)),
        ("a=0?1:2, b=true && \"b\"; a+b", text("2b")),
        ("a=0?1:2, b=true || \"b\"; a+b", num(3.0)),
        ("a=0?1&&1:2&&2.1, b=false || \"b\"; a+b", text("2.1b")),
        ("a=0?1&&1:2&&2.1, b=false?'f':'t' || \"b\" && \"c\"; a+b", text("2.1t")),
    ]);
}

#[test]
fn test_if_statements() {
    check(&[
        ("a=1; if (a) a='y'; a", text("y")),
        ("self.a=1; if (self.a) self.a=\"y\"; self.a", text("y")),
        ("if (0) a=1\nelse a=2; a+a", num(4.0)),
        ("if (1) {a=1\na+=2}else a=4; a+a", num(6.0)),
        ("if (0) {a=1\na+=2}else a=4; a+a", num(8.0)),
        ("if (1) a=4\nelse\n\n{a=1\na+=2} a+a", num(8.0)),
        ("if (0) a=4\nelse\n\n{a=1\na+=2} a+a", num(6.0)),
    ]);
}

#[test]
fn test_logical_assignment() {
    check(&[
        ("a=1; a&&=2", num(2.0)),
        ("a=1; (a&&=2) + a", num(4.0)),
        ("a=1; a||=2", num(1.0)),
        ("a=1; (a||=2) + a", num(2.0)),
        ("a=1; b = a ||= 2", num(1.0)),
        ("a=1; a &&= a && 0; a", num(0.0)),
        ("a=1; a &&= a || 0; a", num(1.0)),
        ("a=1; a &&= a && 2; a", num(2.0)),
        ("a=1; a &&= a || 2; a", num(1.0)),
        ("a=1; a &&= a ||= 2; a", num(1.0)),
        ("a=1; a ||= a &&= 2; a", num(1.0)),
        ("a=0; a ||= a &&= 2; a", num(0.0)),
        ("a=null; a ??= 5; a", num(5.0)),
        ("a=0; a ??= 5; a", num(0.0)),
    ]);
    assert!(eval("a=1; a ||= b = 2; a+b").to_number().is_nan());
}

#[test]
fn test_compound_assignment() {
    check(&[
        ("a=0x7 << 1; a >>= 2", num(3.0)),
        ("a=-1\n a >>= 2", num(-1.0)),
        ("a=-1; a <<= 2", num(-4.0)),
        ("a=-1\n;; a >>>= 2", num(1073741823.0)),
        ("a=10; a**=3", num(1000.0)),
        (
            "a=-0; a+=100; a-=30; a*=0.1; a/=0.0123; a%=12; a&=a; a|=128; a^=7; a*a",
            num(16900.0),
        ),
        ("a = b = 5; a + b", num(10.0)),
        ("a = b = c = /./; a === c", Value::Boolean(true)),
    ]);
}

#[test]
fn test_update_expressions() {
    check(&[
        ("a=3; ++a * 2", num(8.0)),
        ("a=3; ++a * 2; a", num(4.0)),
        ("a=3; 5 + ++a * 2", num(13.0)),
        ("a=3; 5 + ++a * 2; a", num(4.0)),
        ("a=3; a++ * 2", num(6.0)),
        ("a=3; a++ * 2; a", num(4.0)),
        ("a=3; 5 + a++ * 2", num(11.0)),
        ("a=3; 5 + a++ * 2; a", num(4.0)),
        ("a='5'; a--", num(5.0)),
        ("a='5'; --a", num(4.0)),
    ]);
}

#[test]
fn test_typeof() {
    check(&[
        ("typeof a", text("undefined")),
        ("a=[]; typeof a.b", text("undefined")),
        ("typeof('')", text("string")),
        ("typeof Math.max", text("function")),
        ("typeof null", text("object")),
    ]);
}

#[test]
fn test_optional_chaining() {
    check(&[
        ("self.fake?.prop", Value::Undefined),
        ("a={prop: [0]}; a?.prop?.length", num(1.0)),
        ("a=null; a?.b.c.d", Value::Undefined),
        ("a=null; a?.b()", Value::Undefined),
    ]);
}

#[test]
fn test_aggregates() {
    let merged = eval("a={k2: \"v2\"}; b={k1: \"v1\", ...a, k3: \"v3\"}");
    assert_eq!(
        merged.to_json(),
        serde_json::json!({"k1": "v1", "k2": "v2", "k3": "v3"})
    );

    let keys = eval("a={k2: \"v2\", k3: \"v3\"}; [\"k1\", ...Object.keys(a), \"k4\"]");
    assert_eq!(keys.to_json(), serde_json::json!(["k1", "k2", "k3", "k4"]));

    let literal = eval("({\"a\": 1, bb: '2', 10: 11, [1+1]: 3})");
    assert_eq!(
        literal.to_json(),
        serde_json::json!({"a": 1, "bb": "2", "10": 11, "2": 3})
    );

    assert_eq!(eval("({a: false,})").to_json(), serde_json::json!({"a": false}));
    assert_eq!(eval("({})").to_json(), serde_json::json!({}));
}
