mod check_test;
mod common;
mod generate_test;
