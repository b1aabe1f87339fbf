/// Find an item by name: an exact match wins, otherwise the first name
/// that matches ignoring case and surrounding whitespace
pub(crate) fn find_by_name<T, F>(items: impl IntoIterator<Item = T>, name: &str, key: F) -> Option<T>
where
    F: Fn(&T) -> &str,
{
    let mut items: Vec<T> = items.into_iter().collect();

    if let Some(index) = items.iter().position(|item| key(item) == name) {
        return Some(items.swap_remove(index));
    }

    let wanted = name.trim().to_lowercase();
    let index = items
        .iter()
        .position(|item| key(item).trim().to_lowercase() == wanted)?;
    Some(items.swap_remove(index))
}
