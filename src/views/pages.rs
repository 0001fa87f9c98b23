//! Public content pages

use super::{layout, Chrome};

pub fn home(chrome: &Chrome) -> String {
    layout(
        "Home",
        chrome,
        r#"<h1>Welcome to Lodging Bookings</h1>
<p>Your home away from home, set on the quiet edge of town. Two rooms, each with its own character, are waiting for you.</p>
<p><a class="btn btn-success" href="/search-availability">Make Reservation Now</a></p>"#,
    )
}

pub fn about(chrome: &Chrome) -> String {
    layout(
        "About",
        chrome,
        r#"<h1>About</h1>
<p>A small family-run lodging with two rooms. We answer every booking request personally.</p>"#,
    )
}

fn room_page(chrome: &Chrome, room_name: &str, description: &str) -> String {
    let body = format!(
        r#"<h1>{name}</h1>
<p>{description}</p>
<form id="check-availability" class="availability-check" method="post" action="/search-availability-json" data-room-id="{room_id}">
<input type="date" name="start" required> <input type="date" name="end" required>
<input type="hidden" name="room_id" value="{room_id}">
<button type="submit" class="btn btn-success">Check Availability</button>
</form>
<div id="availability-result"></div>"#,
        name = super::escape(room_name),
        description = description,
        room_id = room_id_for(room_name),
    );
    layout(room_name, chrome, &body)
}

/// Seeded ids of the two rooms with their own page
fn room_id_for(room_name: &str) -> i32 {
    if room_name == MAJORS_SUITE {
        2
    } else {
        1
    }
}

pub const GENERALS_QUARTERS: &str = "General's Quarters";
pub const MAJORS_SUITE: &str = "Major's Suite";

pub fn generals_quarters(chrome: &Chrome) -> String {
    room_page(
        chrome,
        GENERALS_QUARTERS,
        "A spacious room with a view over the garden, a king-size bed and a private bathroom.",
    )
}

pub fn majors_suite(chrome: &Chrome) -> String {
    room_page(
        chrome,
        MAJORS_SUITE,
        "A quiet suite under the eaves with a reading corner, a queen-size bed and a private bathroom.",
    )
}

pub fn contact(chrome: &Chrome) -> String {
    layout(
        "Contact",
        chrome,
        r#"<h1>Contact</h1>
<p>Questions about a stay? Write to us and we will get back to you within a day.</p>"#,
    )
}

pub fn search_availability(chrome: &Chrome) -> String {
    layout(
        "Search for Availability",
        chrome,
        r#"<h1>Search for Availability</h1>
<form method="post" action="/search-availability" class="needs-validation" novalidate>
<div class="form-group"><label for="start">Starting Date</label><input type="date" id="start" name="start" class="form-control" required></div>
<div class="form-group"><label for="end">Ending Date</label><input type="date" id="end" name="end" class="form-control" required></div>
<button type="submit" class="btn btn-primary">Search Availability</button>
</form>"#,
    )
}
