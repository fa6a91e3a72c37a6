mod bootstrap_tests;
mod daemon_tests;
mod dev_server_tests;
