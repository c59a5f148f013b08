#[rocket::launch]
fn rocket() -> _ {
    yatube::rocket()
}
