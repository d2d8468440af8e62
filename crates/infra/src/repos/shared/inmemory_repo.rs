use reminder_scheduler_domain::{Entity, ID};
use std::sync::Mutex;

/// Useful functions for creating inmemory repositories

pub fn insert<T: Clone>(val: &T, collection: &Mutex<Vec<T>>) {
    let mut collection = collection.lock().unwrap();
    collection.push(val.clone());
}

/// Replaces the stored entity with `val` if `guard` accepts the stored
/// entity. Returns whether the entity was replaced.
pub fn save_if<T: Clone + Entity, F: Fn(&T) -> bool>(
    val: &T,
    collection: &Mutex<Vec<T>>,
    guard: F,
) -> bool {
    let mut collection = collection.lock().unwrap();
    match collection.iter_mut().find(|item| item.id() == val.id()) {
        Some(item) if guard(item) => {
            *item = val.clone();
            true
        }
        _ => false,
    }
}

pub fn find_by<T: Clone + Entity, F: FnMut(&T) -> bool>(
    collection: &Mutex<Vec<T>>,
    mut compare: F,
) -> Vec<T> {
    let collection = collection.lock().unwrap();
    let mut items = Vec::new();
    for item in collection.iter() {
        if compare(item) {
            items.push(item.clone());
        }
    }
    items
}

pub fn find_one_by<T: Clone + Entity, F: FnMut(&T) -> bool>(
    collection: &Mutex<Vec<T>>,
    compare: F,
) -> Option<T> {
    find_by(collection, compare).into_iter().next()
}

pub fn delete_one_by<T: Clone + Entity, F: Fn(&T) -> bool>(
    collection: &Mutex<Vec<T>>,
    val_id: &ID,
    compare: F,
) -> Option<T> {
    let mut collection = collection.lock().unwrap();
    let index = collection
        .iter()
        .position(|item| item.id() == val_id && compare(item))?;
    Some(collection.remove(index))
}

pub fn find_and_delete_by<T: Clone + Entity, F: Fn(&T) -> bool>(
    collection: &Mutex<Vec<T>>,
    compare: F,
) -> Vec<T> {
    let mut collection = collection.lock().unwrap();
    let mut deleted_items = Vec::new();

    for index in (0..collection.len()).rev() {
        if compare(&collection[index]) {
            let deleted_item = collection.remove(index);
            deleted_items.push(deleted_item);
        }
    }

    deleted_items
}
