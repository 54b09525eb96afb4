use std::env;
use std::path::PathBuf;

const MIN_VERSION: &str = "1.35.0";

fn main() {
    println!("cargo:rerun-if-changed=src/ffi/bridge.rs");
    println!("cargo:rerun-if-changed=src/ffi/aria2_session.cpp");
    println!("cargo:rerun-if-changed=src/ffi/include/downpour/aria2_session.hpp");
    println!("cargo:rerun-if-env-changed=ARIA2_INCLUDE_DIR");
    println!("cargo:rerun-if-env-changed=ARIA2_LIB_DIR");

    // Stub builds must not require libaria2 or a C++ toolchain.
    if env::var_os("CARGO_FEATURE_LIBARIA2").is_none() {
        return;
    }

    let mut bridge = cxx_build::bridge("src/ffi/bridge.rs");
    bridge.flag_if_supported("-std=c++17");
    bridge.file("src/ffi/aria2_session.cpp");
    bridge.include(PathBuf::from("src/ffi/include"));

    let include_override = env::var_os("ARIA2_INCLUDE_DIR").map(PathBuf::from);
    if let Some(path) = include_override.as_ref() {
        bridge.include(path);
    }

    if let Some(path) = env::var_os("ARIA2_LIB_DIR").map(PathBuf::from) {
        println!("cargo:rustc-link-search=native={}", path.display());
        println!("cargo:rustc-link-lib=aria2");
    } else {
        match pkg_config::Config::new()
            .atleast_version(MIN_VERSION)
            .probe("libaria2")
        {
            Ok(library) => {
                for path in library.include_paths {
                    bridge.include(path);
                }
                for path in library.link_paths {
                    println!("cargo:rustc-link-search=native={}", path.display());
                }
                for lib in library.libs {
                    println!("cargo:rustc-link-lib={lib}");
                }
            }
            Err(err) => {
                eprintln!("libaria2 pkg-config probe failed: {err}");
                std::process::exit(1);
            }
        }
    }

    bridge.compile("downpour-aria2");
}
