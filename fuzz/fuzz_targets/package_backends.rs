#![no_main]

use libfuzzer_sys::fuzz_target;
use packmatrix_packager::{BackendRegistry, BuildEnv, parse_str, validate};

// 검증을 통과한 디스크립터는 모든 백엔드에서 패닉 없이 처리되어야 함
fuzz_target!(|data: &[u8]| {
    let Ok(yaml) = std::str::from_utf8(data) else {
        return;
    };
    let env = BuildEnv::new("/nonexistent").with_var("BUILD_ARCH", "arm64");
    let Ok(set) = parse_str(yaml, &env) else {
        return;
    };
    let registry = BackendRegistry::with_builtin();
    for format in registry.formats() {
        let Ok(info) = set.get(format) else { continue };
        if validate(&info).is_err() {
            continue;
        }
        let Ok(backend) = registry.get(format) else { continue };
        if backend.validate(&info).is_err() {
            continue;
        }
        let mut out = Vec::new();
        let _ = backend.package(&backend.with_defaults(info), &mut out);
    }
});
