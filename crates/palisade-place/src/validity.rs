/// Combine the probe signals for the candidate pose.
///
/// `height` is `None` when the instance carries no height probe; that means
/// terrain does not constrain it.
#[inline]
pub fn evaluate(colliding: bool, height: Option<bool>) -> bool {
    !colliding && height.unwrap_or(true)
}
