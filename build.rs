use std::{env, fs, path::PathBuf};

fn main() {
    // 1) Place the linker memory map for the firmware target
    let target = env::var("TARGET").expect("cargo sets TARGET");
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("cargo sets OUT_DIR"));

    let memory_file = if target.starts_with("thumbv8m") {
        Some("memory-pico2.x")
    } else if target.starts_with("thumbv6m") {
        Some("memory-pico1.x")
    } else {
        None
    };
    if let Some(memory_file) = memory_file {
        let memory_x = fs::read_to_string(memory_file)
            .unwrap_or_else(|err| panic!("Failed to read {memory_file}: {err}"));
        fs::write(out_dir.join("memory.x"), memory_x).expect("Failed to write memory.x");
        println!("cargo:rustc-link-search={}", out_dir.display());
        println!("cargo:rerun-if-changed={memory_file}");
    }

    // 2) Load optional env files
    let _ = dotenvy::from_filename(".env");
    load_home_env(".pico.env");

    // 3) Poll period, clamped in `shared_constants`
    let tick_ms = env_or_default("FAN_REMOTE_TICK_MS", "10");
    if tick_ms.is_empty() || !tick_ms.bytes().all(|byte| byte.is_ascii_digit()) {
        println!("cargo:warning=FAN_REMOTE_TICK_MS={tick_ms:?} is not a number; using 10");
        println!("cargo:rustc-env=FAN_REMOTE_TICK_MS=10");
    } else {
        if !matches!(tick_ms.parse::<u32>(), Ok(1..=100)) {
            println!("cargo:warning=FAN_REMOTE_TICK_MS={tick_ms} is clamped to 1..=100");
        }
        println!("cargo:rustc-env=FAN_REMOTE_TICK_MS={tick_ms}");
    }

    println!("cargo:rerun-if-env-changed=FAN_REMOTE_TICK_MS");
    println!("cargo:rerun-if-changed=.env");
}

fn load_home_env(file: &str) {
    let home = match env::var_os("USERPROFILE").or_else(|| env::var_os("HOME")) {
        Some(path) => PathBuf::from(path),
        None => return,
    };
    let _ = dotenvy::from_path(home.join(file));
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
