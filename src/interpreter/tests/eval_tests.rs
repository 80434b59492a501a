use super::helpers::run_source;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::values::Value;

#[test]
fn arithmetic_and_control_flow() {
    let (result, output) = run_source(
        r#"
        int main() {
            int total = 0;
            int i = 1;
            while (i <= 5) {
                if (i % 2 == 0) {
                    total = total + i * 10;
                } else {
                    total = total + i;
                }
                i = i + 1;
            }
            printf("total=%d\n", total);
            return total;
        }
        "#,
    );
    assert_eq!(output, "total=69\n");
    assert_eq!(result.unwrap(), Value::int(69));
}

#[test]
fn mixed_numeric_arithmetic_promotes_to_float() {
    let (result, _) = run_source(
        r#"
        float main() {
            return 1 + 0.5;
        }
        "#,
    );
    assert_eq!(result.unwrap(), Value::float(1.5));
}

#[test]
fn integer_arithmetic_wraps_on_overflow() {
    let (result, _) = run_source("int main() { return 9223372036854775807 + 1; }");
    assert_eq!(result.unwrap(), Value::int(i64::MIN));

    let (result, _) = run_source("int main() { return -(-9223372036854775807 - 1); }");
    assert_eq!(result.unwrap(), Value::int(i64::MIN));

    let (result, _) = run_source("int main() { return 9223372036854775807 * 2; }");
    assert_eq!(result.unwrap(), Value::int(-2));

    // i64::MIN / -1 and % -1 are the division-shaped overflow cases.
    let (result, _) = run_source("int main() { return (-9223372036854775807 - 1) / (0 - 1); }");
    assert_eq!(result.unwrap(), Value::int(i64::MIN));
    let (result, _) = run_source("int main() { return (-9223372036854775807 - 1) % (0 - 1); }");
    assert_eq!(result.unwrap(), Value::int(0));
}

#[test]
fn integer_division_by_zero_is_an_error() {
    let (result, _) = run_source("int main() { return 1 / 0; }");
    assert_eq!(result.unwrap_err(), RuntimeError::DivisionByZero);
}

#[test]
fn function_calls_pass_arguments_by_value() {
    let (result, output) = run_source(
        r#"
        int bump(int x) {
            x = x + 1;
            return x;
        }
        int main() {
            int a = 10;
            int b = bump(a);
            printf("%d %d\n", a, b);
            return b;
        }
        "#,
    );
    assert_eq!(output, "10 11\n");
    assert_eq!(result.unwrap(), Value::int(11));
}

#[test]
fn globals_visible_across_functions() {
    let (result, _) = run_source(
        r#"
        int counter = 100;
        void bump() {
            counter = counter + 1;
        }
        int main() {
            bump();
            bump();
            return counter;
        }
        "#,
    );
    assert_eq!(result.unwrap(), Value::int(102));
}

#[test]
fn short_circuit_skips_right_operand() {
    // The right side would divide by zero if evaluated.
    let (result, _) = run_source(
        r#"
        int main() {
            if (0 && 1 / 0) {
                return 1;
            }
            if (1 || 1 / 0) {
                return 2;
            }
            return 3;
        }
        "#,
    );
    assert_eq!(result.unwrap(), Value::int(2));
}

#[test]
fn unknown_variable_is_an_error() {
    let (result, _) = run_source("int main() { return ghost; }");
    assert_eq!(
        result.unwrap_err(),
        RuntimeError::UnknownVariable("ghost".to_string())
    );
}

#[test]
fn missing_main_is_an_error() {
    let (result, _) = run_source("int helper() { return 1; }");
    assert_eq!(
        result.unwrap_err(),
        RuntimeError::UnknownFunction("main".to_string())
    );
}

#[test]
fn arity_mismatch_is_an_error() {
    let (result, _) = run_source(
        r#"
        int f(int a, int b) { return a + b; }
        int main() { return f(1); }
        "#,
    );
    assert_eq!(
        result.unwrap_err(),
        RuntimeError::ArityMismatch {
            name: "f".to_string(),
            expected: 2,
            got: 1,
        }
    );
}

#[test]
fn block_scopes_shadow_and_restore() {
    let (result, output) = run_source(
        r#"
        int main() {
            int x = 1;
            if (1) {
                int x = 2;
                printf("%d\n", x);
            }
            printf("%d\n", x);
            return x;
        }
        "#,
    );
    assert_eq!(output, "2\n1\n");
    assert_eq!(result.unwrap(), Value::int(1));
}
