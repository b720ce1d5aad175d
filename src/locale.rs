//! Ambient locale detection used to seed the default `language` option.

/// Best-effort source of the user's preferred locale tag (`"fr-FR"`,
/// `"en_US.UTF-8"`, ...). Returning `None` leaves `language` unset.
pub trait AmbientLocale: Send + Sync {
    fn locale(&self) -> Option<String>;
}

impl<F> AmbientLocale for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn locale(&self) -> Option<String> {
        self()
    }
}

/// Reads the platform locale.
///
/// Native targets look at `LC_ALL`, `LC_MESSAGES` and `LANG`; `wasm32`
/// targets read `navigator.language` from the JS global object.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemLocale;

impl AmbientLocale for SystemLocale {
    #[cfg(not(target_arch = "wasm32"))]
    fn locale(&self) -> Option<String> {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .into_iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
    }

    #[cfg(target_arch = "wasm32")]
    fn locale(&self) -> Option<String> {
        use wasm_bindgen::JsValue;

        let navigator = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("navigator")).ok()?;
        if navigator.is_undefined() || navigator.is_null() {
            return None;
        }
        js_sys::Reflect::get(&navigator, &JsValue::from_str("language"))
            .ok()?
            .as_string()
    }
}

/// Two-letter language code from a locale tag; `None` for `C`/`POSIX` and
/// anything not starting with two ASCII letters.
pub(crate) fn language_from_locale(locale: &str) -> Option<String> {
    let tag = locale.trim();
    if tag.eq_ignore_ascii_case("c") || tag.eq_ignore_ascii_case("posix") {
        return None;
    }
    let code = tag.get(..2)?;
    if !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    if tag[2..].chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(code.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::{language_from_locale, AmbientLocale};

    #[test]
    fn extracts_language_from_common_tags() {
        assert_eq!(language_from_locale("fr-FR").as_deref(), Some("fr"));
        assert_eq!(language_from_locale("en_US.UTF-8").as_deref(), Some("en"));
        assert_eq!(language_from_locale("DE").as_deref(), Some("de"));
    }

    #[test]
    fn ignores_neutral_or_malformed_locales() {
        assert_eq!(language_from_locale("C"), None);
        assert_eq!(language_from_locale("POSIX"), None);
        assert_eq!(language_from_locale("C.UTF-8"), None);
        assert_eq!(language_from_locale(""), None);
        assert_eq!(language_from_locale("12"), None);
    }

    #[test]
    fn closures_are_locale_sources() {
        let locale = || Some("it-IT".to_owned());
        assert_eq!(locale.locale().as_deref(), Some("it-IT"));
    }
}
