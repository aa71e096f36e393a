mod common;
mod control_tests;
mod generate_tests;
mod init_tests;
mod run_script_tests;
