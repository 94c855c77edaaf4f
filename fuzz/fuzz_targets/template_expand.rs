#![no_main]

use libfuzzer_sys::fuzz_target;
use packmatrix_packager::BuildEnv;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let env = BuildEnv::new("/fuzz").with_var("SEMVER", "v1.0.0-rc1");
        let expanded = env.expand(input);
        // 변수가 없는 입력은 그대로 유지되어야 함
        if !input.contains('$') {
            assert_eq!(expanded, input);
        }
    }
});
