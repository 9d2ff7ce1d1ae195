/// In-process command registry
///
/// Useful when embedding the engine in a host that pulls commands out after a
/// refresh, and in tests.

use crate::db::RegisteredCommand;
use crate::error::{RecentsError, Result};
use crate::registry::CommandRegistry;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct MemoryRegistry {
    commands: Mutex<BTreeMap<String, RegisteredCommand>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every registered command, ordered by code
    pub fn commands(&self) -> Vec<RegisteredCommand> {
        self.contents().values().cloned().collect()
    }

    pub fn get(&self, code: &str) -> Option<RegisteredCommand> {
        self.contents().get(code).cloned()
    }

    pub fn len(&self) -> usize {
        self.contents().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Reads see what is stored even if a writer panicked mid-call
    fn contents(&self) -> MutexGuard<'_, BTreeMap<String, RegisteredCommand>> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, RegisteredCommand>>> {
        self.commands
            .lock()
            .map_err(|_| RecentsError::Registry("registry lock poisoned".to_string()))
    }
}

impl CommandRegistry for MemoryRegistry {
    async fn upsert(&self, command: RegisteredCommand) -> Result<()> {
        self.lock()?.insert(command.code.clone(), command);
        Ok(())
    }

    async fn remove(&self, code: &str) -> Result<()> {
        self.lock()?.remove(code);
        Ok(())
    }
}
