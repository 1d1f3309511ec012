use proc_macro2::TokenStream;
use quote::quote;
use syn::Path;

/// Environment variable naming the runtime crate path for generated code.
pub const CRATE_ENV: &str = "PREFBIND_CRATE";

fn env_path(name: &str) -> Option<TokenStream> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .and_then(|value| syn::parse_str::<Path>(&value).ok())
        .map(|path| quote!(#path))
}

///
/// CratePaths
///
/// Resolves the runtime crate root used by generated binders. An explicit
/// `#[preferences(crate = "...")]` argument wins, then `PREFBIND_CRATE`,
/// then the public `::prefbind` facade.
///

#[derive(Clone, Debug)]
pub struct CratePaths {
    pub runtime: TokenStream,
}

impl CratePaths {
    #[must_use]
    pub fn new(explicit: Option<&Path>) -> Self {
        let runtime = explicit
            .map(|path| quote!(#path))
            .or_else(|| env_path(CRATE_ENV))
            .unwrap_or_else(|| quote!(::prefbind));

        Self { runtime }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct TempEnv {
        key: &'static str,
        prev: Option<String>,
    }

    impl TempEnv {
        fn set(key: &'static str, value: Option<&str>) -> Self {
            let prev = env::var(key).ok();
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
            Self { key, prev }
        }
    }

    impl Drop for TempEnv {
        fn drop(&mut self) {
            unsafe {
                match &self.prev {
                    Some(value) => env::set_var(self.key, value),
                    None => env::remove_var(self.key),
                }
            }
        }
    }

    #[test]
    fn defaults_to_the_facade() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _env = TempEnv::set(CRATE_ENV, None);

        let paths = CratePaths::new(None);

        assert_eq!(paths.runtime.to_string(), quote!(::prefbind).to_string());
    }

    #[test]
    fn honors_env_override() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _env = TempEnv::set(CRATE_ENV, Some(" renamed::prefs "));

        let paths = CratePaths::new(None);

        assert_eq!(paths.runtime.to_string(), quote!(renamed::prefs).to_string());
    }

    #[test]
    fn explicit_argument_beats_env() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _env = TempEnv::set(CRATE_ENV, Some("renamed::prefs"));
        let explicit: Path = syn::parse_quote!(crate::vendored);

        let paths = CratePaths::new(Some(&explicit));

        assert_eq!(paths.runtime.to_string(), quote!(crate::vendored).to_string());
    }
}
