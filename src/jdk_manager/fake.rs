use crate::error::ESResult;
use crate::jdk_manager::{Jdk, JdkManager, JdkManagerError, Provider};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// In-memory [JdkManager]. Clones share state, so a test can keep one to inspect what a command
/// did with the other.
#[derive(Clone, Default)]
pub struct FakeJdkManager {
    state: Rc<RefCell<FakeState>>,
}

#[derive(Default)]
pub struct FakeState {
    pub installed: Vec<Jdk>,
    pub available: Vec<Jdk>,
    pub installs: Vec<String>,
    pub uninstalls: Vec<String>,
    pub lookups: usize,
}

impl FakeJdkManager {
    pub fn new(installed: Vec<Jdk>, available: Vec<Jdk>) -> Self {
        let fake = Self::default();
        {
            let mut state = fake.state.borrow_mut();
            state.installed = installed;
            state.available = available;
        }
        fake
    }

    pub fn state(&self) -> std::cell::Ref<'_, FakeState> {
        self.state.borrow()
    }
}

impl JdkManager for FakeJdkManager {
    fn list_installed_jdks(&self) -> ESResult<Vec<Jdk>, JdkManagerError> {
        let mut state = self.state.borrow_mut();
        state.lookups += 1;
        Ok(state.installed.clone())
    }

    fn list_available_jdks(&self) -> ESResult<Vec<Jdk>, JdkManagerError> {
        let mut state = self.state.borrow_mut();
        state.lookups += 1;
        Ok(state.available.clone())
    }

    fn list_providers(&self, install_root: &Path) -> Vec<Provider> {
        vec![Provider {
            name: "fake".to_string(),
            description: format!("Fake JDKs in {}", install_root.display()),
        }]
    }

    fn install(&self, jdk: &Jdk) -> ESResult<Jdk, JdkManagerError> {
        let mut state = self.state.borrow_mut();
        state.installs.push(jdk.id.clone());
        state.installed.retain(|j| j.id != jdk.id);
        state.installed.push(jdk.clone());
        Ok(jdk.clone())
    }

    fn uninstall_jdk(&self, jdk: &Jdk) -> ESResult<(), JdkManagerError> {
        let mut state = self.state.borrow_mut();
        state.uninstalls.push(jdk.id.clone());
        state.installed.retain(|j| j.id != jdk.id);
        Ok(())
    }

    fn can_update(&self, jdk: &Jdk) -> bool {
        jdk.provider != "javahome"
    }
}
