pub mod helpers;

mod coroutine_tests;
mod eval_tests;
