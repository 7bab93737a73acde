pub mod waf_server;
