//! Booking flow and login pages

use super::{escape, layout, text_input, Chrome};
use crate::{
    forms::FormErrors,
    models::{ReservationDraft, Room},
    services::availability::DATE_FORMAT,
};

pub fn choose_room(chrome: &Chrome, rooms: &[Room]) -> String {
    let items: String = rooms
        .iter()
        .map(|room| {
            format!(
                r#"<li><a href="/choose-room/{}">{}</a></li>"#,
                room.id,
                escape(&room.room_name)
            )
        })
        .collect();
    layout(
        "Choose a Room",
        chrome,
        &format!("<h1>Choose a Room</h1>\n<ul class=\"rooms\">{}</ul>", items),
    )
}

pub fn make_reservation(chrome: &Chrome, draft: &ReservationDraft, errors: Option<&FormErrors>) -> String {
    let guest = &draft.guest;
    let body = format!(
        r#"<h1>Make Reservation</h1>
<p><strong>Reservation Details</strong><br>
Room: {room}<br>
Arrival: {start}<br>
Departure: {end}</p>
<form method="post" action="/make-reservation" novalidate>
<input type="hidden" name="start_date" value="{start}">
<input type="hidden" name="end_date" value="{end}">
{first_name}
{last_name}
{email}
{phone}
<button type="submit" class="btn btn-primary">Make Reservation</button>
</form>"#,
        room = escape(draft.room_name.as_deref().unwrap_or_default()),
        start = draft.start_date.format(DATE_FORMAT),
        end = draft.end_date.format(DATE_FORMAT),
        first_name = text_input("first_name", "First name", "text", &guest.first_name, errors),
        last_name = text_input("last_name", "Last name", "text", &guest.last_name, errors),
        email = text_input("email", "Email", "email", &guest.email, errors),
        phone = text_input("phone", "Phone number", "text", &guest.phone, errors),
    );
    layout("Make Reservation", chrome, &body)
}

pub fn reservation_summary(chrome: &Chrome, draft: &ReservationDraft) -> String {
    let guest = &draft.guest;
    let body = format!(
        r#"<h1>Reservation Summary</h1>
<table class="table">
<tr><td>Name:</td><td>{first} {last}</td></tr>
<tr><td>Room:</td><td>{room}</td></tr>
<tr><td>Arrival:</td><td>{start}</td></tr>
<tr><td>Departure:</td><td>{end}</td></tr>
<tr><td>Email:</td><td>{email}</td></tr>
<tr><td>Phone:</td><td>{phone}</td></tr>
</table>"#,
        first = escape(&guest.first_name),
        last = escape(&guest.last_name),
        room = escape(draft.room_name.as_deref().unwrap_or_default()),
        start = draft.start_date.format(DATE_FORMAT),
        end = draft.end_date.format(DATE_FORMAT),
        email = escape(&guest.email),
        phone = escape(&guest.phone),
    );
    layout("Reservation Summary", chrome, &body)
}

pub fn login(chrome: &Chrome, email: &str, errors: Option<&FormErrors>) -> String {
    let body = format!(
        r#"<h1>Login</h1>
<form method="post" action="/user/login" novalidate>
{email}
{password}
<button type="submit" class="btn btn-primary">Submit</button>
</form>"#,
        email = text_input("email", "Email", "email", email, errors),
        password = text_input("password", "Password", "password", "", errors),
    );
    layout("Login", chrome, &body)
}
