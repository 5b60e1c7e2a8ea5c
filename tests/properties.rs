use std::path::{Path, PathBuf};

use proptest::prelude::*;

use detect_runner::environment::{
    EnvironmentContext, DETECT_AIR_GAP, DETECT_DOWNLOAD_URL, DETECT_JAR, DETECT_SCRIPT,
};
use detect_runner::exec::command_line::{has_logging_level, LOGGING_LEVEL_KEY};
use detect_runner::exec::{CommandLine, Identification, Launcher};
use detect_runner::strategy::{ExecutionStrategy, StrategyResolver};
use detect_runner::types::{LogLevel, OsFamily};

const DEFAULT_URL: &str = "https://repo.example.com/detect/";

fn resolver() -> StrategyResolver {
    StrategyResolver::new(DEFAULT_URL, "/tools", OsFamily::Unix)
}

fn path_strategy() -> impl Strategy<Value = String> {
    "/[a-z]{1,8}(/[a-z0-9_-]{1,8}){0,3}"
}

fn level_strategy() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Error),
        Just(LogLevel::Warn),
        Just(LogLevel::Info),
        Just(LogLevel::Debug),
        Just(LogLevel::Trace),
    ]
}

/// Other signals that could compete with `DETECT_JAR`.
#[derive(Debug, Clone)]
struct Noise {
    air_gap: Option<&'static str>,
    env_script: Option<String>,
    env_url: Option<String>,
    caller_jar: Option<String>,
    caller_script: Option<String>,
}

fn noise_strategy() -> impl Strategy<Value = Noise> {
    (
        proptest::option::of(prop_oneof![Just("true"), Just("false"), Just("1"), Just("")]),
        proptest::option::of(path_strategy()),
        proptest::option::of("https://[a-z]{3,8}\\.example\\.com/detect\\.jar"),
        proptest::option::of(path_strategy()),
        proptest::option::of(path_strategy()),
    )
        .prop_map(|(air_gap, env_script, env_url, caller_jar, caller_script)| Noise {
            air_gap,
            env_script,
            env_url,
            caller_jar,
            caller_script,
        })
}

fn env_with(noise: &Noise) -> EnvironmentContext {
    let mut env = EnvironmentContext::new();
    if let Some(v) = noise.air_gap {
        env.put(DETECT_AIR_GAP, v);
    }
    if let Some(v) = &noise.env_script {
        env.put(DETECT_SCRIPT, v.as_str());
    }
    if let Some(v) = &noise.env_url {
        env.put(DETECT_DOWNLOAD_URL, v.as_str());
    }
    env
}

fn random_case(s: &str, mask: &[bool]) -> String {
    s.chars()
        .zip(mask.iter().cycle())
        .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c })
        .collect()
}

fn identification() -> Identification {
    Identification {
        host_version: "2.440.1".to_string(),
        plugin_version: "0.1.0".to_string(),
    }
}

proptest! {
    #[test]
    fn detect_jar_in_environment_always_wins(jar in path_strategy(), noise in noise_strategy()) {
        let mut env = env_with(&noise);
        env.put(DETECT_JAR, jar.as_str());

        let strategy = resolver().resolve(
            &env,
            noise.caller_jar.as_deref().map(Path::new),
            noise.caller_script.as_deref().map(Path::new),
        );

        prop_assert_eq!(strategy, ExecutionStrategy::Jar { path: PathBuf::from(jar) });
    }

    #[test]
    fn without_any_signal_the_jar_is_downloaded(env_url in proptest::option::of("https://[a-z]{3,8}\\.example\\.com/")) {
        let mut env = EnvironmentContext::new();
        if let Some(url) = &env_url {
            env.put(DETECT_DOWNLOAD_URL, url.as_str());
        }

        let strategy = resolver().resolve(&env, None, None);

        prop_assert_eq!(
            strategy,
            ExecutionStrategy::Download {
                url: env_url.unwrap_or_else(|| DEFAULT_URL.to_string()),
                cache_dir: PathBuf::from("/tools/detect"),
            }
        );
    }

    #[test]
    fn logging_level_is_injected_at_most_once(
        mask in proptest::collection::vec(any::<bool>(), 1..16),
        supplied in any::<bool>(),
        level in level_strategy(),
        user_level in level_strategy(),
        extra in proptest::collection::vec("--detect\\.[a-z]{1,8}=[a-z0-9]{0,6}", 0..4),
    ) {
        let mut properties = extra.clone();
        if supplied {
            properties.push(format!("--{}={user_level}", random_case(LOGGING_LEVEL_KEY, &mask)));
        }

        let launcher = Launcher::for_jar(PathBuf::from("java"), PathBuf::from("/tools/detect.jar"));
        let cmd = CommandLine::assemble(&launcher, &properties, level, &identification());

        let matching: Vec<&String> = cmd
            .argv()
            .iter()
            .filter(|a| a.to_lowercase().contains(LOGGING_LEVEL_KEY))
            .collect();
        prop_assert_eq!(matching.len(), 1);
        prop_assert_eq!(has_logging_level(&properties), supplied);
        if !supplied {
            prop_assert_eq!(
                matching[0].clone(),
                format!("--{LOGGING_LEVEL_KEY}={level}")
            );
        }

        // Identification arguments are always the hidden tail.
        let visible = cmd.visible();
        prop_assert_eq!(visible.len() + 2, cmd.argv().len());
        prop_assert!(!cmd.display().contains("phone.home"));
    }
}
