//! Builds REST resource paths.

/// Joins (resource name, optional id) pairs into a slash-delimited path,
/// skipping the ids that are absent. The order of the pairs is kept as is since it
/// encodes the nesting of the resources.
///
/// ```rust
/// use markus_client::resource_path;
///
/// let path = resource_path([
///     ("assignments", Some(1)),
///     ("groups", None),
///     ("annotations", None),
/// ]);
/// assert_eq!(path, "assignments/1/groups/annotations");
/// ```
pub fn resource_path<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, Option<u64>)>,
{
    let mut path = String::new();
    for (name, id) in pairs {
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(name);
        if let Some(id) = id {
            path.push('/');
            path.push_str(&id.to_string());
        }
    }
    path
}
