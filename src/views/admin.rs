//! Back-office pages

use chrono::Datelike;

use super::{admin_layout, escape, text_input, Chrome};
use crate::{
    forms::FormErrors,
    models::{GuestDetails, Reservation, ReservationSource},
    services::{
        availability::DATE_FORMAT,
        calendar::{
            add_block_field, day_key, remove_block_field, return_path, CalendarMonth, CalendarView,
            RoomCalendar,
        },
    },
};

pub fn dashboard(chrome: &Chrome) -> String {
    admin_layout(
        "Dashboard",
        chrome,
        r#"<h1>Dashboard</h1>
<p>Review <a href="/admin/reservations-new">new reservations</a>, browse <a href="/admin/reservations-all">all reservations</a> or manage owner blocks on the <a href="/admin/reservations-calendar">reservation calendar</a>.</p>"#,
    )
}

pub fn reservations_list(chrome: &Chrome, source: ReservationSource, reservations: &[Reservation]) -> String {
    let title = match source {
        ReservationSource::New => "New Reservations",
        ReservationSource::All | ReservationSource::Calendar => "All Reservations",
    };
    let rows: String = reservations
        .iter()
        .map(|r| {
            format!(
                r#"<tr><td>{id}</td><td><a href="/admin/reservations/{src}/{id}">{last}</a></td><td>{room}</td><td>{start}</td><td>{end}</td><td>{status}</td></tr>"#,
                id = r.id,
                src = source,
                last = escape(&r.last_name),
                room = escape(&r.room_name),
                start = r.start_date.format(DATE_FORMAT),
                end = r.end_date.format(DATE_FORMAT),
                status = if r.is_processed() { "Processed" } else { "New" },
            )
        })
        .collect();

    let body = format!(
        r#"<h1>{title}</h1>
<table class="table" id="{src}-res">
<thead><tr><th>ID</th><th>Last Name</th><th>Room</th><th>Arrival</th><th>Departure</th><th>Status</th></tr></thead>
<tbody>{rows}</tbody>
</table>"#,
        title = title,
        src = source,
        rows = rows,
    );
    admin_layout(title, chrome, &body)
}

/// Reservation detail with the guest edit form. `guest` holds the values to show,
/// which differ from the stored ones after a rejected edit. `month` is set when
/// the page was opened from the calendar and is carried through every action.
pub fn reservation_show(
    chrome: &Chrome,
    source: ReservationSource,
    month: Option<CalendarMonth>,
    reservation: &Reservation,
    guest: &GuestDetails,
    errors: Option<&FormErrors>,
) -> String {
    let query = month.map(|m| format!("?{}", m.query())).unwrap_or_default();
    let process = if reservation.is_processed() {
        String::new()
    } else {
        format!(
            r#"<a class="btn btn-success" href="/admin/process-reservation/{}/{}{}">Mark as Processed</a> "#,
            source,
            reservation.id,
            query
        )
    };

    let body = format!(
        r#"<h1>Reservation {id}</h1>
<p>Arrival: {start}<br>Departure: {end}<br>Room: {room}</p>
<form method="post" action="/admin/reservations/{src}/{id}{query}" novalidate>
{first_name}
{last_name}
{email}
{phone}
<button type="submit" class="btn btn-primary">Save</button>
<a class="btn btn-warning" href="{back}">Cancel</a>
</form>
<p>{process}<a class="btn btn-danger" href="/admin/delete-reservation/{src}/{id}{query}">Delete</a></p>"#,
        id = reservation.id,
        start = reservation.start_date.format(DATE_FORMAT),
        end = reservation.end_date.format(DATE_FORMAT),
        room = escape(&reservation.room_name),
        src = source,
        query = query,
        first_name = text_input("first_name", "First name", "text", &guest.first_name, errors),
        last_name = text_input("last_name", "Last name", "text", &guest.last_name, errors),
        email = text_input("email", "Email", "email", &guest.email, errors),
        phone = text_input("phone", "Phone number", "text", &guest.phone, errors),
        back = return_path(source, month),
        process = process,
    );
    admin_layout(&format!("Reservation {}", reservation.id), chrome, &body)
}

fn room_table(month: CalendarMonth, month_days: &[(u32, String)], calendar: &RoomCalendar) -> String {
    let room_id = calendar.room.id;
    let header: String = month_days
        .iter()
        .map(|(n, _)| format!("<td class=\"text-center\">{}</td>", n))
        .collect();

    let cells: String = month_days
        .iter()
        .map(|(_, key)| {
            let reservation = calendar.reservations.get(key).copied().unwrap_or(0);
            let block = calendar.blocks.get(key).copied().unwrap_or(0);
            let content = if reservation > 0 {
                format!(
                    r#"<a class="text-danger" href="/admin/reservations/cal/{}?{}">R</a>"#,
                    reservation,
                    month.query()
                )
            } else if block > 0 {
                format!(
                    r#"<input type="checkbox" name="{}" value="{}" checked>"#,
                    remove_block_field(room_id, key),
                    block
                )
            } else {
                format!(
                    r#"<input type="checkbox" name="{}" value="1">"#,
                    add_block_field(room_id, key)
                )
            };
            format!("<td class=\"text-center\">{}</td>", content)
        })
        .collect();

    format!(
        r#"<h4 class="mt-4">{}</h4>
<table class="table table-bordered table-sm"><tr>{}</tr><tr>{}</tr></table>"#,
        escape(&calendar.room.room_name),
        header,
        cells
    )
}

pub fn calendar(chrome: &Chrome, view: &CalendarView) -> String {
    let month = view.month;
    let (previous, next) = (month.previous(), month.next());
    let month_days: Vec<(u32, String)> = month.days().map(|d| (d.day(), day_key(d))).collect();
    let tables: String = view
        .rooms
        .iter()
        .map(|room| room_table(month, &month_days, room))
        .collect();

    let body = format!(
        r#"<h1>Reservations Calendar</h1>
<div class="calendar-nav">
<a class="btn btn-secondary" href="/admin/reservations-calendar?y={py}&m={pm:02}">&lt;&lt;</a>
<span class="calendar-month">{label}</span>
<a class="btn btn-secondary" href="/admin/reservations-calendar?y={ny}&m={nm:02}">&gt;&gt;</a>
</div>
<form method="post" action="/admin/reservations-calendar">
<input type="hidden" name="y" value="{y}">
<input type="hidden" name="m" value="{m:02}">
{tables}
<button type="submit" class="btn btn-primary">Save Changes</button>
</form>"#,
        py = previous.year(),
        pm = previous.month(),
        ny = next.year(),
        nm = next.month(),
        label = month.label(),
        y = month.year(),
        m = month.month(),
        tables = tables,
    );
    admin_layout("Reservations Calendar", chrome, &body)
}
