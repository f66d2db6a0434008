mod logging;
mod unit_test_macro;
