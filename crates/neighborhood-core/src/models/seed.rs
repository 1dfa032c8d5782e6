//! Seed data loaded into a fresh `Neighborhood`.
//!
//! Nothing is persisted: every start begins from these collections.

use chrono::NaiveDate;

use super::{Announcement, Feedback, Priority, Resident, ScheduleEntry, Shift, Status};

fn day(year: i32, month: u32, date: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, date).unwrap_or(NaiveDate::MIN)
}

fn resident(id: u64, name: &str, address: &str, phone: &str, email: &str, status: Status) -> Resident {
    Resident {
        id,
        name: name.to_string(),
        address: address.to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
        status,
    }
}

pub fn residents() -> Vec<Resident> {
    vec![
        resident(1, "Budi Santoso", "Jl. Mawar No. 10", "08123456789", "budi@contoh.com", Status::Active),
        resident(2, "Siti Nurhaliza", "Jl. Melati No. 15", "08234567890", "siti@contoh.com", Status::Active),
        resident(3, "Ahmad Wijaya", "Jl. Bunga No. 20", "08345678901", "ahmad@contoh.com", Status::Active),
        resident(4, "Dwi Retno", "Jl. Anggrek No. 25", "08456789012", "dwi@contoh.com", Status::Inactive),
        resident(5, "Riyanto", "Jl. Tulip No. 30", "08567890123", "riyanto@contoh.com", Status::Active),
    ]
}

fn shift(id: u64, name: &str, shift: Shift, date: NaiveDate) -> ScheduleEntry {
    ScheduleEntry {
        id,
        name: name.to_string(),
        shift,
        date,
        time: shift.default_time().to_string(),
        status: Status::Active,
    }
}

pub fn schedule() -> Vec<ScheduleEntry> {
    vec![
        shift(1, "Budi Santoso", Shift::Morning, day(2024, 1, 20)),
        shift(2, "Ahmad Wijaya", Shift::Afternoon, day(2024, 1, 20)),
        shift(3, "Riyanto", Shift::Night, day(2024, 1, 20)),
        shift(4, "Budi Santoso", Shift::Morning, day(2024, 1, 21)),
        shift(5, "Ahmad Wijaya", Shift::Afternoon, day(2024, 1, 21)),
    ]
}

pub fn announcements() -> Vec<Announcement> {
    let ann = |id, title: &str, content: &str, author: &str, date, priority| Announcement {
        id,
        title: title.to_string(),
        content: content.to_string(),
        author: author.to_string(),
        date,
        priority,
    };

    vec![
        ann(
            1,
            "Pengumuman Pemeliharaan Jalan",
            "Pemeliharaan jalan akan dilakukan pada tanggal 22-23 Januari 2024. Mohon pengertian atas ketidaknyamanan yang ditimbulkan.",
            "RT 01",
            day(2024, 1, 19),
            Priority::High,
        ),
        ann(
            2,
            "Penerimaan Iuran Bulanan",
            "Pengumpulan iuran bulanan untuk bulan Januari dibuka hingga tanggal 25 Januari. Silakan hubungi ketua RT untuk pembayaran.",
            "RW 02",
            day(2024, 1, 18),
            Priority::Medium,
        ),
        ann(
            3,
            "Arisan Bulanan Komunitas",
            "Undian arisan bulanan akan dilaksanakan hari Minggu, 21 Januari 2024 di balai warga.",
            "RT 01",
            day(2024, 1, 17),
            Priority::Low,
        ),
        ann(
            4,
            "Pembersihan Lingkungan Bersama",
            "Jadwal pembersihan lingkungan bersama akan dilakukan setiap hari Minggu pukul 07:00 pagi. Partisipasi diharapkan dari semua warga.",
            "RT 01",
            day(2024, 1, 16),
            Priority::Medium,
        ),
    ]
}

pub fn feedback() -> Vec<Feedback> {
    let fb = |id, author: &str, title: &str, content: &str, date, rating| Feedback {
        id,
        author: author.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        date,
        rating,
        reply: None,
    };

    vec![
        fb(
            1,
            "Budi Santoso",
            "Sistem air mati berkali-kali",
            "Kami mengalami pemadaman air yang sangat sering, mohon perhatian dari RT.",
            day(2024, 1, 19),
            2,
        ),
        fb(
            2,
            "Siti Nurhaliza",
            "Jalan depan berlubang",
            "Jalan gang A sudah berlubang besar, berbahaya untuk kendaraan.",
            day(2024, 1, 18),
            2,
        ),
        fb(
            3,
            "Ahmad Wijaya",
            "Lampu jalan di depan rumah rusak",
            "Lampu jalan nomor 5 sudah mati selama 2 minggu.",
            day(2024, 1, 17),
            3,
        ),
        fb(
            4,
            "Dwi Retno",
            "Kebersihan area parkir kurang",
            "Area parkir komunal perlu dibersihkan lebih sering.",
            day(2024, 1, 16),
            3,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{next_id, Entity};

    #[test]
    fn test_seed_sizes() {
        assert_eq!(residents().len(), 5);
        assert_eq!(schedule().len(), 5);
        assert_eq!(announcements().len(), 4);
        assert_eq!(feedback().len(), 4);
    }

    #[test]
    fn test_seed_ids_unique() {
        let ids: Vec<u64> = residents().iter().map(Entity::id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(next_id(&residents()), 6);
        assert_eq!(next_id(&announcements()), 5);
        assert_eq!(next_id::<Announcement>(&[]), 1);
    }

    #[test]
    fn test_seed_validates_against_schema() {
        for r in residents() {
            assert!(Resident::schema().validate(&r.to_form()).is_ok());
        }
        for s in schedule() {
            assert!(ScheduleEntry::schema().validate(&s.to_form()).is_ok());
        }
        for a in announcements() {
            assert!(Announcement::schema().validate(&a.to_form()).is_ok());
        }
    }
}
