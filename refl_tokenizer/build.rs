// build.rs - TOML-driven constant generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    lexical: LexicalLimits,
    stream: StreamLimits,
    arena: ArenaLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_name_length: usize,
    max_string_length: usize,
    max_number_length: usize,
}

#[derive(serde::Deserialize)]
struct StreamLimits {
    max_saved_states: usize,
    max_replay_saved_states: usize,
}

#[derive(serde::Deserialize)]
struct ArenaLimits {
    initial_token_list_capacity: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=REFL_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=REFL_CONFIG_DIR");

    let profile = env::var("REFL_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("REFL_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of refl_tokenizer directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_NAME_LENGTH: usize = 65_536;
    const ABSOLUTE_MAX_STRING_LENGTH: usize = 1_048_576;

    if config.lexical.max_name_length == 0
        || config.lexical.max_name_length > ABSOLUTE_MAX_NAME_LENGTH
    {
        panic!("LIMITS: max_name_length must be in 1..={}", ABSOLUTE_MAX_NAME_LENGTH);
    }

    if config.lexical.max_string_length == 0
        || config.lexical.max_string_length > ABSOLUTE_MAX_STRING_LENGTH
    {
        panic!(
            "LIMITS: max_string_length must be in 1..={}",
            ABSOLUTE_MAX_STRING_LENGTH
        );
    }

    if config.lexical.max_number_length == 0 {
        panic!("LIMITS: max_number_length cannot be zero");
    }

    if config.stream.max_saved_states == 0 {
        panic!("LIMITS: max_saved_states cannot be zero");
    }

    // The replay reader's save stack is fixed at two levels.
    if config.stream.max_replay_saved_states != 2 {
        panic!("LIMITS: max_replay_saved_states must be 2");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("SECURITY: security_min_log_level too high (max: 2)");
    }

    if profile == "production" && config.logging.log_buffer_size > 50_000 {
        panic!("PRODUCTION: log_buffer_size too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod lexical {{
        pub const MAX_NAME_LENGTH: usize = {};
        pub const MAX_STRING_LENGTH: usize = {};
        pub const MAX_NUMBER_LENGTH: usize = {};
    }}

    pub mod stream {{
        pub const MAX_SAVED_STATES: usize = {};
        pub const MAX_REPLAY_SAVED_STATES: usize = {};
    }}

    pub mod arena {{
        pub const INITIAL_TOKEN_LIST_CAPACITY: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        // Lexical
        config.lexical.max_name_length,
        config.lexical.max_string_length,
        config.lexical.max_number_length,
        // Stream
        config.stream.max_saved_states,
        config.stream.max_replay_saved_states,
        // Arena
        config.arena.initial_token_list_capacity,
        // Logging
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
