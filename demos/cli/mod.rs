use std::env;
use std::process;

use gmdata::{init_logging, ClientConfig, ClientHandle, LoggingConfig};

pub fn usage_and_exit(usage: &str) -> ! {
    eprintln!("{usage}");
    process::exit(1);
}

pub struct ArgParser {
    args: Vec<String>,
    usage: &'static str,
}

impl ArgParser {
    pub fn new(usage: &'static str) -> Self {
        let args: Vec<String> = env::args().skip(1).collect();

        if args.iter().any(|a| a == "--help" || a == "-h") {
            println!("{usage}");
            process::exit(0);
        }

        Self { args, usage }
    }

    pub fn take_value(&mut self, names: &[&str]) -> Option<String> {
        let i = self.args.iter().position(|a| names.contains(&a.as_str()))?;
        if i + 1 >= self.args.len() {
            usage_and_exit(self.usage);
        }
        let value = self.args.remove(i + 1);
        self.args.remove(i);
        Some(value)
    }

    pub fn remaining(self) -> Vec<String> {
        self.args
    }
}

pub struct Connection {
    pub config: ClientConfig,
    pub positionals: Vec<String>,
}

#[allow(dead_code)] // Some demos read extra flags before the positionals.
pub fn parse_connection(usage: &'static str) -> Connection {
    let mut parser = ArgParser::new(usage);
    let mut connection = connection_from_parser(&mut parser, usage);
    connection.positionals = parser.remaining();
    connection
}

/// `--url`/`--user-dn`/`--log-level`, falling back to `GMDATA_URL` and
/// `GMDATA_USER_DN`.
pub fn connection_from_parser(parser: &mut ArgParser, usage: &'static str) -> Connection {
    let url = parser.take_value(&["--url", "-u"]);
    let user_dn = parser.take_value(&["--user-dn"]);
    let level = parser.take_value(&["--log-level"]);

    let mut config = match url {
        Some(url) => ClientConfig::new(url),
        None => ClientConfig::from_env().unwrap_or_else(|_| usage_and_exit(usage)),
    };
    if let Some(dn) = user_dn {
        config = config.with_identity(dn);
    }
    if let Some(level) = level {
        config = config.with_logging(LoggingConfig {
            level,
            ..LoggingConfig::default()
        });
    }

    Connection {
        config,
        positionals: Vec::new(),
    }
}

impl Connection {
    pub async fn connect(&self) -> gmdata::Result<ClientHandle> {
        init_logging(&self.config.logging)?;
        println!("Connecting to {}...", self.config.base_url);
        let client = ClientHandle::connect(&self.config).await?;
        println!("Connected as: {}", client.get_self().await?);
        Ok(client)
    }
}
