use super::helpers::run_source;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::values::Value;

#[test]
fn resume_interleaves_driver_and_coroutine() {
    // Classic ping-pong: the body runs A up to its suspend on the first
    // resume, then B to completion on the second. Extra resumes are inert.
    let (result, output) = run_source(
        r#"
        float co_body() {
            printf("A\n");
            suspend 0.0;
            printf("B\n");
            return 1.0;
        }
        int main() {
            void * h = co_await co_body();
            resume h;
            printf("C\n");
            resume h;
            printf("D\n");
            resume h;
            if (h != NULL) {
                printf("valid\n");
            }
            return 0;
        }
        "#,
    );
    assert_eq!(output, "A\nC\nB\nD\nvalid\n");
    assert_eq!(result.unwrap(), Value::int(0));
}

#[test]
fn body_does_not_run_before_first_resume() {
    let (result, output) = run_source(
        r#"
        float co_body() {
            printf("inside\n");
            return 0.0;
        }
        int main() {
            void * h = co_await co_body();
            printf("before-resume\n");
            resume h;
            return 0;
        }
        "#,
    );
    assert_eq!(output, "before-resume\ninside\n");
    assert!(result.is_ok());
}

#[test]
fn coroutines_have_independent_locals() {
    let (result, output) = run_source(
        r#"
        float worker(int base) {
            int n = base;
            suspend 0.0;
            n = n + 1;
            printf("%d\n", n);
            return 0.0;
        }
        int main() {
            void * a = co_await worker(10);
            void * b = co_await worker(20);
            resume a;
            resume b;
            resume b;
            resume a;
            return 0;
        }
        "#,
    );
    assert_eq!(output, "21\n11\n");
    assert!(result.is_ok());
}

#[test]
fn co_await_evaluates_arguments_eagerly() {
    // tick() runs at co_await time, on the caller's thread, exactly once,
    // even though the body never runs.
    let (result, _) = run_source(
        r#"
        int counter = 0;
        int tick() {
            counter = counter + 1;
            return counter;
        }
        float idfn(int x) {
            suspend 0.0;
            return 0.0;
        }
        int main() {
            void * h = co_await idfn(tick());
            return counter;
        }
        "#,
    );
    assert_eq!(result.unwrap(), Value::int(1));
}

#[test]
fn runtime_error_in_body_surfaces_at_resume() {
    let (result, output) = run_source(
        r#"
        float co_body() {
            suspend 0.0;
            return 1 / 0;
        }
        int main() {
            void * h = co_await co_body();
            resume h;
            printf("first-ok\n");
            resume h;
            printf("unreachable\n");
            return 0;
        }
        "#,
    );
    assert_eq!(output, "first-ok\n");
    assert_eq!(result.unwrap_err(), RuntimeError::DivisionByZero);
}

#[test]
fn suspend_in_main_is_an_error() {
    let (result, _) = run_source(
        r#"
        int main() {
            suspend 0.0;
            return 0;
        }
        "#,
    );
    assert_eq!(result.unwrap_err(), RuntimeError::SuspendOutsideCoroutine);
}

#[test]
fn resume_of_non_handle_is_an_error() {
    let (result, _) = run_source("int main() { resume NULL; return 0; }");
    assert_eq!(result.unwrap_err(), RuntimeError::InvalidHandle);

    let (result, _) = run_source("int main() { resume 42; return 0; }");
    assert_eq!(result.unwrap_err(), RuntimeError::InvalidHandle);
}

#[test]
fn self_resume_is_rejected() {
    let (result, _) = run_source(
        r#"
        void * g_h = NULL;
        float selfish() {
            resume g_h;
            return 0.0;
        }
        int main() {
            g_h = co_await selfish();
            resume g_h;
            return 0;
        }
        "#,
    );
    assert_eq!(result.unwrap_err(), RuntimeError::CoroutineBusy);
}

#[test]
fn suspended_coroutines_are_torn_down_at_exit() {
    // main returns while the coroutine is still parked at its suspend; the
    // run must complete and return without hanging on the carrier thread.
    let (result, output) = run_source(
        r#"
        float endless() {
            while (1) {
                suspend 0.0;
            }
            return 0.0;
        }
        int main() {
            void * h = co_await endless();
            resume h;
            resume h;
            printf("done\n");
            return 0;
        }
        "#,
    );
    assert_eq!(output, "done\n");
    assert_eq!(result.unwrap(), Value::int(0));
}

#[test]
fn coroutine_can_drive_another_coroutine() {
    let (result, output) = run_source(
        r#"
        void * inner_h = NULL;
        float inner() {
            printf("inner\n");
            return 0.0;
        }
        float outer() {
            resume inner_h;
            printf("outer\n");
            return 0.0;
        }
        int main() {
            inner_h = co_await inner();
            void * h = co_await outer();
            resume h;
            return 0;
        }
        "#,
    );
    assert_eq!(output, "inner\nouter\n");
    assert!(result.is_ok());
}

#[test]
fn handles_compare_distinct_and_non_null() {
    let (result, output) = run_source(
        r#"
        float w() {
            suspend 0.0;
            return 0.0;
        }
        int main() {
            void * a = co_await w();
            void * b = co_await w();
            if (a != NULL) { printf("a-valid\n"); }
            if (a != b) { printf("distinct\n"); }
            if (a == a) { printf("same\n"); }
            return 0;
        }
        "#,
    );
    assert_eq!(output, "a-valid\ndistinct\nsame\n");
    assert!(result.is_ok());
}
