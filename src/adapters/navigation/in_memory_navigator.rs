//! In-Memory Navigator
//!
//! Holds the current location and records redirects and history
//! replacements. Used for tests and for headless embedding where no browser
//! owns the location.

use reqwest::Url;
use std::sync::{Arc, RwLock};

use crate::ports::{NavigationError, Navigator};

#[derive(Debug, Clone)]
pub struct InMemoryNavigator {
    location: Arc<RwLock<Url>>,
    redirects: Arc<RwLock<Vec<Url>>>,
    replacements: Arc<RwLock<Vec<Url>>>,
}

impl InMemoryNavigator {
    pub fn new(location: Url) -> Self {
        Self {
            location: Arc::new(RwLock::new(location)),
            redirects: Arc::new(RwLock::new(Vec::new())),
            replacements: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Parses `location` and starts there.
    pub fn at(location: &str) -> Result<Self, NavigationError> {
        Url::parse(location)
            .map(Self::new)
            .map_err(|_| NavigationError::InvalidLocation(location.to_string()))
    }

    /// Simulates the browser landing on a new page (e.g. a provider callback).
    pub fn land_on(&self, location: Url) {
        if let Ok(mut current) = self.location.write() {
            *current = location;
        }
    }

    pub fn redirects(&self) -> Vec<Url> {
        self.redirects.read().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn replacements(&self) -> Vec<Url> {
        self.replacements.read().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Navigator for InMemoryNavigator {
    fn current_location(&self) -> Url {
        match self.location.read() {
            Ok(location) => location.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn redirect(&self, target: &Url) -> Result<(), NavigationError> {
        let mut redirects = self
            .redirects
            .write()
            .map_err(|_| NavigationError::Failed("navigator lock poisoned".to_string()))?;
        redirects.push(target.clone());
        drop(redirects);
        self.land_on(target.clone());
        Ok(())
    }

    fn replace_location(&self, location: &Url) -> Result<(), NavigationError> {
        let mut replacements = self
            .replacements
            .write()
            .map_err(|_| NavigationError::Failed("navigator lock poisoned".to_string()))?;
        replacements.push(location.clone());
        drop(replacements);
        self.land_on(location.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_moves_location_and_is_recorded() {
        let navigator = InMemoryNavigator::at("https://book.example/docs/intro").unwrap();
        let target = Url::parse("https://accounts.example/o/auth?x=1").unwrap();

        navigator.redirect(&target).unwrap();

        assert_eq!(navigator.current_location(), target);
        assert_eq!(navigator.redirects(), vec![target]);
    }

    #[test]
    fn origin_excludes_path() {
        let navigator = InMemoryNavigator::at("http://localhost:3000/docs/ch4?q=1").unwrap();
        assert_eq!(navigator.origin(), "http://localhost:3000");
    }

    #[test]
    fn invalid_location_is_rejected() {
        assert!(InMemoryNavigator::at("not a url").is_err());
    }
}
