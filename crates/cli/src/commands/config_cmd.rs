//! `lectern config`: print a default configuration file.

use lectern_config::AppConfig;

pub fn run() {
    println!("# lectern configuration");
    println!("# The API key is best supplied through OPENROUTER_API_KEY.");
    println!();
    print!("{}", AppConfig::default_toml());
}
