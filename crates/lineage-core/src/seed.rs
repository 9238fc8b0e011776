//! Sample registry: a principal with three complete ancestor generations.

use chrono::NaiveDate;

use crate::person::{NewPerson, Person, Sex};

/// One row of the sample table.
struct Row {
    id: &'static str,
    nin: &'static str,
    surname: &'static str,
    given_name: &'static str,
    sex: Sex,
    born: (i32, u32, u32),
    place: &'static str,
    father: Option<(&'static str, &'static str)>,
    mother: Option<(&'static str, &'static str)>,
}

const ROWS: [Row; 15] = [
    Row {
        id: "1",
        nin: "123456789012345",
        surname: "Keita",
        given_name: "Amadou",
        sex: Sex::Male,
        born: (2000, 6, 15),
        place: "Bamako",
        father: Some(("Keita", "123456789054321")),
        mother: Some(("Coulibaly", "123456789098765")),
    },
    Row {
        id: "2",
        nin: "123456789054321",
        surname: "Keita",
        given_name: "Ibrahim",
        sex: Sex::Male,
        born: (1970, 4, 10),
        place: "Sikasso",
        father: Some(("Keita", "123456789011111")),
        mother: Some(("Diallo", "123456789022222")),
    },
    Row {
        id: "3",
        nin: "123456789098765",
        surname: "Coulibaly",
        given_name: "Fatoumata",
        sex: Sex::Female,
        born: (1975, 8, 22),
        place: "Kayes",
        father: Some(("Coulibaly", "123456789033333")),
        mother: Some(("Toure", "123456789044444")),
    },
    Row {
        id: "4",
        nin: "123456789011111",
        surname: "Keita",
        given_name: "Moussa",
        sex: Sex::Male,
        born: (1945, 3, 5),
        place: "Koulikoro",
        father: Some(("Keita", "123456789111111")),
        mother: Some(("Sylla", "123456789222222")),
    },
    Row {
        id: "5",
        nin: "123456789022222",
        surname: "Diallo",
        given_name: "Aminata",
        sex: Sex::Female,
        born: (1950, 10, 17),
        place: "Mopti",
        father: Some(("Diallo", "123456789333333")),
        mother: Some(("Traore", "123456789444444")),
    },
    Row {
        id: "6",
        nin: "123456789033333",
        surname: "Coulibaly",
        given_name: "Bakary",
        sex: Sex::Male,
        born: (1948, 12, 30),
        place: "Segou",
        father: Some(("Coulibaly", "123456789555555")),
        mother: Some(("Sangare", "123456789666666")),
    },
    Row {
        id: "7",
        nin: "123456789044444",
        surname: "Toure",
        given_name: "Maimouna",
        sex: Sex::Female,
        born: (1952, 2, 25),
        place: "Gao",
        father: Some(("Toure", "123456789777777")),
        mother: Some(("Maiga", "123456789888888")),
    },
    Row {
        id: "8",
        nin: "123456789111111",
        surname: "Keita",
        given_name: "Seydou",
        sex: Sex::Male,
        born: (1920, 6, 10),
        place: "Kati",
        father: None,
        mother: None,
    },
    Row {
        id: "9",
        nin: "123456789222222",
        surname: "Sylla",
        given_name: "Kadiatou",
        sex: Sex::Female,
        born: (1925, 9, 15),
        place: "Koulikoro",
        father: None,
        mother: None,
    },
    Row {
        id: "10",
        nin: "123456789333333",
        surname: "Diallo",
        given_name: "Oumar",
        sex: Sex::Male,
        born: (1922, 4, 20),
        place: "Mopti",
        father: None,
        mother: None,
    },
    Row {
        id: "11",
        nin: "123456789444444",
        surname: "Traore",
        given_name: "Oumou",
        sex: Sex::Female,
        born: (1927, 11, 5),
        place: "Djenné",
        father: None,
        mother: None,
    },
    Row {
        id: "12",
        nin: "123456789555555",
        surname: "Coulibaly",
        given_name: "Modibo",
        sex: Sex::Male,
        born: (1918, 8, 12),
        place: "Segou",
        father: None,
        mother: None,
    },
    Row {
        id: "13",
        nin: "123456789666666",
        surname: "Sangare",
        given_name: "Mariam",
        sex: Sex::Female,
        born: (1923, 3, 8),
        place: "Sikasso",
        father: None,
        mother: None,
    },
    Row {
        id: "14",
        nin: "123456789777777",
        surname: "Toure",
        given_name: "Amadou",
        sex: Sex::Male,
        born: (1921, 2, 15),
        place: "Tombouctou",
        father: None,
        mother: None,
    },
    Row {
        id: "15",
        nin: "123456789888888",
        surname: "Maiga",
        given_name: "Fanta",
        sex: Sex::Female,
        born: (1926, 7, 28),
        place: "Gao",
        father: None,
        mother: None,
    },
];

/// Returns the Keita / Coulibaly sample family.
///
/// Person "1" is the youngest; every other record is one of their ancestors,
/// linked through father and mother NINs.
pub fn sample_family() -> Vec<Person> {
    ROWS.iter()
        .map(|row| {
            let mut person = NewPerson::new(row.nin, row.surname, row.given_name, row.sex);
            let (year, month, day) = row.born;
            person.birth_date = NaiveDate::from_ymd_opt(year, month, day);
            person.birth_place = Some(row.place.to_string());
            if let Some((surname, nin)) = row.father {
                person.father_surname = Some(surname.to_string());
                person.father_nin = Some(nin.to_string());
            }
            if let Some((surname, nin)) = row.mother {
                person.mother_surname = Some(surname.to_string());
                person.mother_nin = Some(nin.to_string());
            }
            person.with_id(row.id)
        })
        .collect()
}
