#![no_main]

use libfuzzer_sys::fuzz_target;
use packmatrix_packager::{BuildEnv, parse_str};

fuzz_target!(|data: &[u8]| {
    // YAML 파서는 &str을 받으므로 UTF-8 변환 필요
    if let Ok(yaml) = std::str::from_utf8(data) {
        let env = BuildEnv::new("/fuzz")
            .with_var("BUILD_ARCH", "amd64")
            .with_var("SEMVER", "v1.0.0");
        if let Ok(set) = parse_str(yaml, &env) {
            for format in ["apk", "deb", "rpm", "snap"] {
                let _ = set.get(format);
            }
        }
    }
});
