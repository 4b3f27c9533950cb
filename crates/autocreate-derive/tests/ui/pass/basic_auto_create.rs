use autocreate_core::{auto_create, AutoCreate, CreationPolicy, TypeKey};

#[auto_create]
#[derive(Default)]
pub struct InputRouter {
    pressed: Vec<String>,
}

fn main() {
    let marked = InputRouter::descriptor();
    assert_eq!(marked.key(), TypeKey::of::<InputRouter>());
    assert_eq!(marked.policy(), CreationPolicy::NoAction);
    assert!(marked.aliases().is_empty());
    assert!(InputRouter::default().pressed.is_empty());
}
