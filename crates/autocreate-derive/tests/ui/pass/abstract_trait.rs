use autocreate_core::{auto_create, find_marked_types, TypeKey};

#[auto_create]
pub trait Service: Send + Sync {
    fn name(&self) -> &'static str;
}

fn main() {
    let types = find_marked_types().unwrap();
    let service = types
        .iter()
        .find(|marked| marked.key() == TypeKey::of::<dyn Service>())
        .unwrap();
    assert!(service.is_abstract());
}
