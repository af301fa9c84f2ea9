use std::env;
use std::fs;
use std::process;

use vcs_cart::prelude::*;
use vcs_cart::vcs::bus::consts::{CART_END, CART_START, PAGE_SIZE};

struct Options {
    image_path: String,
    scheme: Option<String>,
    config_path: Option<String>,
    seed: Option<u64>,
    startup_bank: Option<u16>,
    verbose: bool,
}

fn parse_args() -> Options {
    let mut args = env::args().skip(1);
    let mut image_path: Option<String> = None;
    let mut scheme: Option<String> = None;
    let mut config_path: Option<String> = None;
    let mut seed: Option<u64> = None;
    let mut startup_bank: Option<u16> = None;
    let mut verbose = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-s" | "--scheme" => {
                scheme = Some(args.next().unwrap_or_else(|| {
                    eprintln!("Missing value for {arg}");
                    print_usage_and_exit();
                }));
            }
            "-c" | "--config" => {
                config_path = Some(args.next().unwrap_or_else(|| {
                    eprintln!("Missing value for {arg}");
                    print_usage_and_exit();
                }));
            }
            "--seed" => {
                let val = args.next().unwrap_or_default();
                seed = Some(parse_u64(&val, "seed"));
            }
            "-b" | "--bank" => {
                let val = args.next().unwrap_or_default();
                let bank = parse_u64(&val, "bank");
                startup_bank = Some(u16::try_from(bank).unwrap_or(u16::MAX));
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            _ => {
                if image_path.is_none() {
                    image_path = Some(arg);
                } else {
                    eprintln!("Unexpected argument: {arg}");
                    print_usage_and_exit();
                }
            }
        }
    }

    let image_path = image_path.unwrap_or_else(|| {
        eprintln!("Missing image path.");
        print_usage_and_exit();
    });

    Options {
        image_path,
        scheme,
        config_path,
        seed,
        startup_bank,
        verbose,
    }
}

fn parse_u64(value: &str, name: &str) -> u64 {
    if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).unwrap_or_else(|_| {
            eprintln!("Invalid hex {name}: {value}");
            print_usage_and_exit();
        })
    } else {
        value.parse::<u64>().unwrap_or_else(|_| {
            eprintln!("Invalid {name}: {value}");
            print_usage_and_exit();
        })
    }
}

fn print_usage_and_exit() -> ! {
    eprintln!("Usage: cart-probe <image_path> [options]");
    eprintln!("Options:");
    eprintln!("  -s, --scheme <name>         Force a scheme (2K, 4K, F8, F8SC, F6, F6SC, F4, F4SC)");
    eprintln!("  -c, --config <file>         Settings as JSON");
    eprintln!("      --seed <n>              Power-on seed (overrides config)");
    eprintln!("  -b, --bank <n>              Start bank (overrides config)");
    eprintln!("  -v, --verbose               Debug logging and per-page map");
    process::exit(2);
}

fn load_settings(opts: &Options) -> Settings {
    let mut settings = match &opts.config_path {
        Some(path) => {
            let json = fs::read_to_string(path).unwrap_or_else(|err| {
                eprintln!("Failed to read config '{path}': {err}");
                process::exit(2);
            });
            Settings::from_json(&json).unwrap_or_else(|err| {
                eprintln!("Config error in '{path}': {err}");
                process::exit(2);
            })
        }
        None => Settings::default(),
    };

    if opts.seed.is_some() {
        settings.seed = opts.seed;
    }
    if opts.startup_bank.is_some() {
        settings.startup_bank = opts.startup_bank;
    }
    settings
}

fn print_page_map(bus: &VcsBus) {
    for addr in (CART_START..=CART_END).step_by(PAGE_SIZE) {
        let access = bus.system().page_access(addr);
        let peek = match access.direct_peek_base {
            Some(base) => format!("{:?}+${:04X}", base.region, base.offset),
            None => "peek()".to_string(),
        };
        let poke = match access.direct_poke_base {
            Some(base) => format!("{:?}+${:04X}", base.region, base.offset),
            None => "poke()".to_string(),
        };
        println!("  ${:04X}  {:<10} {:<14} {}", addr, format!("{:?}", access.access_type), peek, poke);
    }
}

fn main() {
    let opts = parse_args();

    let level = if opts.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let settings = load_settings(&opts);
    let image = fs::read(&opts.image_path).unwrap_or_else(|err| {
        eprintln!("Failed to read image '{}': {err}", opts.image_path);
        process::exit(2);
    });

    let cart = match Rom::new(image).and_then(|rom| rom.into_cartridge(opts.scheme.as_deref(), &settings)) {
        Ok(cart) => cart,
        Err(err) => {
            eprintln!("Cartridge error: {err}");
            process::exit(2);
        }
    };

    let mut bus = VcsBus::new(cart, &settings);
    let seed = bus.system_mut().random().initial_seed();
    let reset_vector = u16::from_le_bytes([bus.debug_peek(0x1FFC), bus.debug_peek(0x1FFD)]);

    let cart = bus.cartridge();
    println!("Image:        {}", opts.image_path);
    println!("Scheme:       {}", cart.name());
    println!("Banks:        {}", cart.bank_count());
    println!("RAM:          {} bytes", cart.internal_ram_size());
    println!("Seed:         {seed:#018X}");
    println!("Start bank:   {}", cart.bank());
    println!("Reset vector: ${reset_vector:04X}");

    if opts.verbose {
        println!("Page map:");
        print_page_map(&bus);
    }

    let mut state = Serializer::new();
    if !bus.save_state(&mut state) {
        eprintln!("Snapshot failed");
        process::exit(1);
    }
    println!("Snapshot:     {} bytes", state.len());

    trace_dump!(64);
}
