use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Init,
    Model,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Init(InitArgs),
    Model(ModelArgs),
}

#[derive(Debug, Clone)]
pub struct InitArgs {
    pub config: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ModelArgs {
    pub config: PathBuf,
    /// Overrides catalog.schema from config.
    pub schema: Option<String>,
    /// Overrides catalog.dump from config.
    pub dump: Option<PathBuf>,
    /// Overrides paths.generated from config.
    pub out: Option<PathBuf>,
    /// Resolve only the table list, no columns/keys/indexes/triggers.
    pub bare: bool,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" => Ok(Command::Help(HelpTopic::Root)),
        "init" => parse_init(it.map(|s| s.as_str())),
        "model" => parse_model(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

fn parse_init<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from("rowgen.toml");

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Init)),
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                config = PathBuf::from(token.trim_start_matches("--config="));
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Init(InitArgs { config }))
}

fn parse_model<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from("rowgen.toml");
    let mut schema: Option<String> = None;
    let mut dump: Option<PathBuf> = None;
    let mut out: Option<PathBuf> = None;
    let mut bare = false;

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Model)),
            "--config" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--config requires a value");
                };
                config = PathBuf::from(v);
            }
            _ if token.starts_with("--config=") => {
                config = PathBuf::from(token.trim_start_matches("--config="));
            }
            "--schema" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--schema requires a value");
                };
                schema = Some(v.to_string());
            }
            _ if token.starts_with("--schema=") => {
                schema = Some(token.trim_start_matches("--schema=").to_string());
            }
            "--dump" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--dump requires a value");
                };
                dump = Some(PathBuf::from(v));
            }
            _ if token.starts_with("--dump=") => {
                dump = Some(PathBuf::from(token.trim_start_matches("--dump=")));
            }
            "--out" => {
                let Some(v) = it.next() else {
                    anyhow::bail!("--out requires a value");
                };
                out = Some(PathBuf::from(v));
            }
            _ if token.starts_with("--out=") => {
                out = Some(PathBuf::from(token.trim_start_matches("--out=")));
            }
            "--bare" => bare = true,
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Model(ModelArgs {
        config,
        schema,
        dump,
        out,
        bare,
    }))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
rowgen - schema model builder for generated data-access layers

USAGE:
  rowgen <COMMAND> [OPTIONS]

COMMANDS:
  init          Write a config template and the project directory skeleton
  model         Build the schema model from a catalog dump

Run `rowgen <command> --help` for more."
            );
        }
        HelpTopic::Init => {
            println!(
                "\
USAGE:
  rowgen init [OPTIONS]

OPTIONS:
  --config <FILE>       Output config path (default: rowgen.toml)
  -h, --help            Print help"
            );
        }
        HelpTopic::Model => {
            println!(
                "\
USAGE:
  rowgen model [OPTIONS]

OPTIONS:
  --config <FILE>       Config file path (default: rowgen.toml)
  --schema <NAME>       Schema to build (default: catalog.schema from config)
  --dump <FILE>         Catalog dump path (default: catalog.dump from config)
  --out <DIR>           Output directory (default: paths.generated from config)
  --bare                Resolve only the table list
  -h, --help            Print help"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_model_with_overrides() {
        let args = vec![
            "rowgen".to_string(),
            "model".to_string(),
            "--config".to_string(),
            "conf/rowgen.toml".to_string(),
            "--schema=app".to_string(),
            "--bare".to_string(),
        ];

        let cmd = parse_args(&args).unwrap();
        let Command::Model(m) = cmd else {
            panic!("expected model");
        };
        assert_eq!(m.config, PathBuf::from("conf/rowgen.toml"));
        assert_eq!(m.schema.as_deref(), Some("app"));
        assert!(m.bare);
        assert!(m.dump.is_none());
    }

    #[test]
    fn no_args_is_help() {
        let cmd = parse_args(&["rowgen".to_string()]).unwrap();
        assert!(matches!(cmd, Command::Help(HelpTopic::Root)));
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let args = vec![
            "rowgen".to_string(),
            "init".to_string(),
            "--frobnicate".to_string(),
        ];
        assert!(parse_args(&args).is_err());
    }
}
