const UNSAFE_PATH_CHARS: [char; 4] = ['.', '/', '\\', ':'];

/// Turns an image name into a single URL path segment by replacing every
/// `.`, `/`, `\` and `:` with `_`.
pub fn sanitize_image_name(name: &str) -> String {
    UNSAFE_PATH_CHARS
        .iter()
        .fold(name.to_string(), |acc, c| acc.replace(*c, "_"))
}
