/// Read access to deployment secrets. The live synthesis provider consults
/// this before attempting any remote call so that a missing credential
/// fails fast instead of surfacing as an opaque SDK error.
pub trait SecretsRepository: Send + Sync {
    fn get_secret(&self, name: &str) -> Option<String>;
}

/// Environment-backed secrets, populated from the process environment
/// (optionally via a .env file loaded at config time).
pub struct EnvSecretsRepository;

impl SecretsRepository for EnvSecretsRepository {
    fn get_secret(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_secret_present() {
        std::env::set_var("LESSONVOICE_TEST_SECRET", "sekrit");
        let repo = EnvSecretsRepository;
        assert_eq!(
            repo.get_secret("LESSONVOICE_TEST_SECRET"),
            Some("sekrit".to_string())
        );
        std::env::remove_var("LESSONVOICE_TEST_SECRET");
    }

    #[test]
    fn test_env_secret_absent_or_empty() {
        let repo = EnvSecretsRepository;
        assert_eq!(repo.get_secret("LESSONVOICE_TEST_MISSING"), None);

        std::env::set_var("LESSONVOICE_TEST_EMPTY", "");
        assert_eq!(repo.get_secret("LESSONVOICE_TEST_EMPTY"), None);
        std::env::remove_var("LESSONVOICE_TEST_EMPTY");
    }
}
