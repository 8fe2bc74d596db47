//! clientsort - one-click inventory sorting
//!
//! Headless harness: plans a sort for a menu snapshot and prints or paces
//! the resulting interaction events.

mod config;
mod headless;

use anyhow::Result;
use clientsort_sort::{Modifiers, Peer, ScreenKind, SortOrder};
use config::Config;
use headless::HeadlessConfig;
use std::{env, path::PathBuf};
use tracing::info;

const USAGE: &str = "\
Usage: clientsort --menu <snapshot.json> [options]

Options:
  --config <path>        Settings file (default config/clientsort.json)
  --save-config          Write the validated settings back and continue
  --menu <path>          Menu snapshot to sort
  --anchor <slot id>     Slot the sort is requested at (default 9)
  --order <name>         none, alphabet, catalog, quantity or rawId
  --shift | --ctrl | --alt
                         Pick the order bound to that modifier
  --catalog <path>       Reference item list for catalog order
  --lock <index>         Locked slot in the item-locks layout (repeatable)
  --creative             Creative inventory with the survival tab open
  --creative-hotbar      Creative inventory showing only the hotbar
  --remote               A companion server accepts remote sort messages
  --dispatch             Pace events through the dispatcher instead of listing them
  --remote-peer          Use the dedicated-server tick rate
  --transcript <path>    Write dispatched events as JSON lines
";

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting clientsort v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    if cli.help {
        print!("{USAGE}");
        return Ok(());
    }

    let mut config = Config::load_from_path(&cli.config_path);
    if cli.save_config {
        config.save_to_path(&cli.config_path)?;
        info!("Saved settings to {}", cli.config_path.display());
    }

    let Some(menu_path) = cli.menu else {
        if cli.save_config {
            return Ok(());
        }
        eprint!("{USAGE}");
        anyhow::bail!("--menu is required");
    };
    let menu = headless::load_menu(&menu_path)?;

    let options = config.options;
    let order = cli.order.unwrap_or_else(|| options.order_for(cli.modifiers));
    headless::run(HeadlessConfig {
        menu,
        anchor: cli.anchor,
        order,
        screen: cli.screen,
        remote: cli.remote,
        locked: cli.locked,
        catalog: cli.catalog,
        dispatch: cli.dispatch,
        peer: cli.peer,
        transcript: cli.transcript,
        options,
    })
}

#[derive(Debug)]
struct CliOptions {
    help: bool,
    config_path: PathBuf,
    save_config: bool,
    menu: Option<PathBuf>,
    anchor: usize,
    order: Option<SortOrder>,
    modifiers: Modifiers,
    catalog: Option<PathBuf>,
    locked: Vec<usize>,
    screen: ScreenKind,
    remote: bool,
    dispatch: bool,
    peer: Peer,
    transcript: Option<PathBuf>,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions {
            help: false,
            config_path: PathBuf::from(config::DEFAULT_CONFIG_PATH),
            save_config: false,
            menu: None,
            anchor: 9,
            order: None,
            modifiers: Modifiers::NONE,
            catalog: None,
            locked: Vec::new(),
            screen: ScreenKind::Standard,
            remote: false,
            dispatch: false,
            peer: Peer::Local,
            transcript: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--config" => {
                    if let Some(path) = args.next() {
                        opts.config_path = PathBuf::from(path);
                    } else {
                        tracing::error!("--config requires a file path");
                    }
                }
                "--save-config" => opts.save_config = true,
                "--menu" => {
                    if let Some(path) = args.next() {
                        opts.menu = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--menu requires a file path");
                    }
                }
                "--anchor" => {
                    if let Some(raw) = args.next() {
                        match raw.parse::<usize>() {
                            Ok(value) => opts.anchor = value,
                            Err(err) => {
                                tracing::error!(%err, value = %raw, "--anchor must be a slot id");
                            }
                        }
                    } else {
                        tracing::error!("--anchor requires a slot id");
                    }
                }
                "--order" => {
                    if let Some(raw) = args.next() {
                        match raw.parse::<SortOrder>() {
                            Ok(order) => opts.order = Some(order),
                            Err(err) => tracing::error!(%err, "--order ignored"),
                        }
                    } else {
                        tracing::error!("--order requires an order name");
                    }
                }
                "--shift" => opts.modifiers.shift = true,
                "--ctrl" => opts.modifiers.ctrl = true,
                "--alt" => opts.modifiers.alt = true,
                "--catalog" => {
                    if let Some(path) = args.next() {
                        opts.catalog = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--catalog requires a file path");
                    }
                }
                "--lock" => {
                    if let Some(raw) = args.next() {
                        match raw.parse::<usize>() {
                            Ok(value) => opts.locked.push(value),
                            Err(err) => {
                                tracing::error!(%err, value = %raw, "--lock must be a slot index");
                            }
                        }
                    } else {
                        tracing::error!("--lock requires a slot index");
                    }
                }
                "--creative" => {
                    opts.screen = ScreenKind::Creative {
                        inventory_open: true,
                    }
                }
                "--creative-hotbar" => {
                    opts.screen = ScreenKind::Creative {
                        inventory_open: false,
                    }
                }
                "--remote" => opts.remote = true,
                "--dispatch" => opts.dispatch = true,
                "--remote-peer" => opts.peer = Peer::Remote,
                "--transcript" => {
                    if let Some(path) = args.next() {
                        opts.transcript = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--transcript requires a file path");
                    }
                }
                other => tracing::warn!(arg = other, "Unknown argument ignored"),
            }
        }

        if opts.transcript.is_some() && !opts.dispatch {
            tracing::warn!("--transcript has no effect without --dispatch");
        }
        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliOptions {
        CliOptions::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let opts = parse(&[]);
        assert_eq!(opts.anchor, 9);
        assert_eq!(opts.order, None);
        assert_eq!(opts.screen, ScreenKind::Standard);
        assert_eq!(opts.peer, Peer::Local);
        assert!(!opts.dispatch);
    }

    #[test]
    fn test_parses_flags() {
        let opts = parse(&[
            "--menu",
            "menu.json",
            "--anchor",
            "40",
            "--order",
            "rawId",
            "--shift",
            "--lock",
            "3",
            "--lock",
            "x",
            "--lock",
            "27",
            "--creative-hotbar",
            "--remote",
            "--dispatch",
            "--remote-peer",
        ]);
        assert_eq!(opts.menu, Some(PathBuf::from("menu.json")));
        assert_eq!(opts.anchor, 40);
        assert_eq!(opts.order, Some(SortOrder::RawId));
        assert!(opts.modifiers.shift);
        assert_eq!(opts.locked, vec![3, 27]);
        assert_eq!(
            opts.screen,
            ScreenKind::Creative {
                inventory_open: false
            }
        );
        assert!(opts.remote && opts.dispatch);
        assert_eq!(opts.peer, Peer::Remote);
    }

    #[test]
    fn test_bad_values_are_ignored() {
        let opts = parse(&["--anchor", "abc", "--order", "sideways", "--menu"]);
        assert_eq!(opts.anchor, 9);
        assert_eq!(opts.order, None);
        assert_eq!(opts.menu, None);
    }
}
