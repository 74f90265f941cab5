pub mod books;

use std::sync::Arc;

use bookclub_kernel::settings::Settings;
use bookclub_kernel::ModuleRegistry;
use bookclub_sheets::{Connection, SheetsModule};

/// Register the store connection as a core module and the shelf on top of it
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings, connection: Arc<Connection>) {
    registry.register_core(Arc::new(SheetsModule::new(Arc::clone(&connection))));
    registry.register_custom(books::create_module(settings, connection));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookclub_sheets::MemoryStore;

    #[test]
    fn registers_store_before_shelf() {
        let connection = Arc::new(Connection::with_store(Arc::new(MemoryStore::new())));
        let mut registry = ModuleRegistry::new();
        register_all(&mut registry, &Settings::default(), connection);

        assert_eq!(registry.core_module_count(), 1);
        assert_eq!(registry.custom_module_count(), 1);
        let names: Vec<_> = registry.modules().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["sheets", "books"]);
    }
}
