//! Seed data: the built-in mock dataset and JSON dataset loading.
//!
//! The mock dataset is a school year at a Portuguese secondary school,
//! graded on a 0-20 scale. Timestamps are fixed so that every metric is
//! reproducible given an explicit "today".

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::domain::*;
use crate::error::StoreError;
use crate::invariants::validate_dataset;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("mock date is a valid calendar day")
}

fn at(h: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, min, 0).expect("mock time is a valid clock time")
}

fn stamp(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    day(y, m, d).and_time(at(h, min))
}

#[allow(clippy::too_many_arguments)]
fn subject(
    id: u32,
    name: &str,
    teacher: &str,
    teacher_id: &str,
    code: &str,
    color: &str,
    description: &str,
    current_grade: f64,
    attendance: f64,
) -> Subject {
    Subject {
        id: SubjectId(id),
        name: name.to_string(),
        teacher: teacher.to_string(),
        teacher_id: teacher_id.to_string(),
        code: code.to_string(),
        color: color.to_string(),
        description: description.to_string(),
        current_grade,
        attendance,
    }
}

fn grade(
    id: u32,
    subject: u32,
    value: f64,
    kind: GradeKind,
    date: NaiveDate,
    teacher: &str,
    period: &str,
) -> Grade {
    Grade {
        id: GradeId(id),
        subject_id: SubjectId(subject),
        grade: value,
        max_grade: 20.0,
        kind,
        date,
        teacher: teacher.to_string(),
        period: period.to_string(),
    }
}

const FIRST_TERM: &str = "1º Período";
const SECOND_TERM: &str = "2º Período";

/// The built-in dataset every store starts from unless one is supplied.
pub fn mock_dataset() -> Dataset {
    let student = Student {
        id: StudentId(1),
        name: "Ana Rodrigues".to_string(),
        email: "ana.rodrigues@escola.pt".to_string(),
        student_id: "2024001".to_string(),
        class: "12º A".to_string(),
        year: "2023/2024".to_string(),
        avatar: None,
        enrollment_number: "ENR-2024-001".to_string(),
    };

    let subjects = vec![
        subject(1, "Matemática", "João Santos", "T001", "MAT", "#3B82F6",
            "Análise, funções e cálculo diferencial", 16.5, 95.0),
        subject(2, "Português", "Maria Silva", "T002", "POR", "#10B981",
            "Literatura e gramática", 17.2, 98.0),
        subject(3, "Física", "Carlos Oliveira", "T003", "FIS", "#F59E0B",
            "Mecânica e eletromagnetismo", 13.8, 92.0),
        subject(4, "Química", "Ana Costa", "T004", "QUI", "#EF4444",
            "Química orgânica e reações", 15.0, 90.0),
        subject(5, "Inglês", "Sarah Johnson", "T005", "ING", "#8B5CF6",
            "Língua e cultura inglesa", 18.0, 97.0),
        subject(6, "História", "Pedro Almeida", "T006", "HIS", "#6B7280",
            "História contemporânea", 12.5, 88.0),
        subject(7, "Educação Física", "Rui Ferreira", "T007", "EFI", "#14B8A6",
            "Desporto e condição física", 0.0, 100.0),
    ];

    let grades = vec![
        grade(1, 1, 17.0, GradeKind::Test, day(2024, 1, 10), "João Santos", SECOND_TERM),
        grade(2, 1, 16.0, GradeKind::Exam, day(2024, 1, 18), "João Santos", SECOND_TERM),
        grade(3, 2, 18.0, GradeKind::Assignment, day(2024, 1, 12), "Maria Silva", SECOND_TERM),
        grade(4, 2, 16.5, GradeKind::Test, day(2024, 1, 19), "Maria Silva", SECOND_TERM),
        grade(5, 3, 13.0, GradeKind::Test, day(2024, 1, 11), "Carlos Oliveira", SECOND_TERM),
        grade(6, 3, 14.5, GradeKind::Project, day(2024, 1, 20), "Carlos Oliveira", SECOND_TERM),
        grade(7, 4, 15.0, GradeKind::Exam, day(2024, 1, 15), "Ana Costa", SECOND_TERM),
        grade(8, 5, 18.0, GradeKind::Test, day(2023, 12, 5), "Sarah Johnson", FIRST_TERM),
        grade(9, 6, 12.0, GradeKind::Assignment, day(2023, 12, 12), "Pedro Almeida", FIRST_TERM),
        grade(10, 6, 13.0, GradeKind::Test, day(2024, 1, 16), "Pedro Almeida", SECOND_TERM),
        grade(11, 1, 15.5, GradeKind::Assignment, day(2023, 11, 20), "João Santos", FIRST_TERM),
    ];

    let events = vec![
        Event {
            id: EventId(1),
            title: "Teste de Física".to_string(),
            description: "Teste sobre as leis de Newton".to_string(),
            date: day(2024, 1, 30),
            time: at(10, 0),
            kind: EventKind::Exam,
            subject_id: Some(SubjectId(3)),
            location: Some("Sala 12".to_string()),
        },
        Event {
            id: EventId(2),
            title: "Feira de Ciências".to_string(),
            description: "Apresentação dos projetos de ciências".to_string(),
            date: day(2024, 2, 1),
            time: at(9, 0),
            kind: EventKind::Event,
            subject_id: None,
            location: Some("Pavilhão".to_string()),
        },
        Event {
            id: EventId(3),
            title: "Reunião de Pais".to_string(),
            description: "Reunião de avaliação intercalar".to_string(),
            date: day(2024, 1, 26),
            time: at(18, 0),
            kind: EventKind::Meeting,
            subject_id: None,
            location: Some("Auditório".to_string()),
        },
        Event {
            id: EventId(4),
            title: "Entrega do Projeto de Matemática".to_string(),
            description: "Prazo final para o projeto de estatística".to_string(),
            date: day(2024, 2, 5),
            time: at(23, 59),
            kind: EventKind::Deadline,
            subject_id: Some(SubjectId(1)),
            location: None,
        },
        Event {
            id: EventId(5),
            title: "Férias de Carnaval".to_string(),
            description: "Interrupção letiva".to_string(),
            date: day(2024, 2, 12),
            time: at(0, 0),
            kind: EventKind::Holiday,
            subject_id: None,
            location: None,
        },
    ];

    let payments = vec![
        Payment {
            id: PaymentId(1),
            description: "Propina de Janeiro".to_string(),
            amount: 150.0,
            due_date: day(2024, 1, 10),
            paid_date: Some(day(2024, 1, 8)),
            status: PaymentStatus::Paid,
            kind: PaymentKind::Tuition,
        },
        Payment {
            id: PaymentId(2),
            description: "Propina de Fevereiro".to_string(),
            amount: 150.0,
            due_date: day(2024, 2, 10),
            paid_date: None,
            status: PaymentStatus::Pending,
            kind: PaymentKind::Tuition,
        },
        Payment {
            id: PaymentId(3),
            description: "Taxa de Exame Nacional".to_string(),
            amount: 25.0,
            due_date: day(2024, 1, 15),
            paid_date: None,
            status: PaymentStatus::Pending,
            kind: PaymentKind::Fee,
        },
        Payment {
            id: PaymentId(4),
            description: "Material de Laboratório".to_string(),
            amount: 40.0,
            due_date: day(2024, 1, 31),
            paid_date: None,
            status: PaymentStatus::Pending,
            kind: PaymentKind::Material,
        },
        Payment {
            id: PaymentId(5),
            description: "Transporte Escolar - Janeiro".to_string(),
            amount: 60.0,
            due_date: day(2024, 1, 5),
            paid_date: Some(day(2024, 1, 4)),
            status: PaymentStatus::Paid,
            kind: PaymentKind::Transport,
        },
    ];

    let messages = vec![
        Message {
            id: MessageId(1),
            sender: "João Santos".to_string(),
            sender_type: SenderType::Teacher,
            subject: "Projeto de Matemática".to_string(),
            content: "O enunciado do projeto de estatística já está disponível. \
                      Entrega até 5 de Fevereiro."
                .to_string(),
            date: stamp(2024, 1, 22, 14, 30),
            read: false,
            attachments: vec!["enunciado_projeto.pdf".to_string()],
        },
        Message {
            id: MessageId(2),
            sender: "Direção".to_string(),
            sender_type: SenderType::School,
            subject: "Reunião de Pais".to_string(),
            content: "A reunião de avaliação intercalar realiza-se sexta-feira às 18:00."
                .to_string(),
            date: stamp(2024, 1, 20, 9, 0),
            read: false,
            attachments: Vec::new(),
        },
        Message {
            id: MessageId(3),
            sender: "Maria Silva".to_string(),
            sender_type: SenderType::Teacher,
            subject: "Excelente trabalho".to_string(),
            content: "Parabéns pelo comentário de texto, foi dos melhores da turma.".to_string(),
            date: stamp(2024, 1, 19, 16, 45),
            read: true,
            attachments: Vec::new(),
        },
        Message {
            id: MessageId(4),
            sender: "Portal do Aluno".to_string(),
            sender_type: SenderType::System,
            subject: "Atualização do portal".to_string(),
            content: "O portal passa a mostrar o histórico de pagamentos.".to_string(),
            date: stamp(2024, 1, 15, 8, 0),
            read: true,
            attachments: Vec::new(),
        },
    ];

    let notifications = vec![
        notification(1, "Nova Nota Lançada",
            "Foi lançada a nota do exame de Matemática.",
            NotificationKind::Info, Some(NotificationCategory::Academic),
            stamp(2024, 1, 24, 10, 15), false, Some("/grades")),
        notification(2, "Pagamento em Atraso",
            "A Taxa de Exame Nacional ultrapassou a data de vencimento.",
            NotificationKind::Warning, Some(NotificationCategory::Financial),
            stamp(2024, 1, 24, 9, 0), false, Some("/payments")),
        notification(3, "Prova de Física Agendada",
            "Foi agendada uma prova de Física para o dia 30 de Janeiro às 10:00.",
            NotificationKind::Info, Some(NotificationCategory::Academic),
            stamp(2024, 1, 23, 11, 0), false, None),
        notification(4, "Evento: Feira de Ciências",
            "Não se esqueça de participar na Feira de Ciências no dia 1 de Fevereiro.",
            NotificationKind::Info, Some(NotificationCategory::Event),
            stamp(2024, 1, 22, 12, 0), true, None),
        notification(5, "Mensagem do Professor",
            "O Prof. João Santos enviou uma mensagem sobre o projeto de Matemática.",
            NotificationKind::Info, Some(NotificationCategory::Message),
            stamp(2024, 1, 21, 14, 30), false, Some("/messages")),
        notification(6, "Parabéns! Excelente Desempenho",
            "Parabéns pelo excelente resultado no teste de Português!",
            NotificationKind::Success, Some(NotificationCategory::Academic),
            stamp(2024, 1, 20, 17, 0), true, None),
        notification(7, "Lembrete: Reunião de Pais",
            "Lembre-se da reunião de pais marcada para sexta-feira às 18:00.",
            NotificationKind::Warning, Some(NotificationCategory::Event),
            stamp(2024, 1, 19, 8, 30), false, None),
        notification(8, "Nova Propina Disponível",
            "A propina de Fevereiro já está disponível para pagamento.",
            NotificationKind::Info, Some(NotificationCategory::Financial),
            stamp(2024, 1, 18, 9, 0), true, Some("/payments")),
    ];

    let resources = vec![
        Resource {
            id: ResourceId(1),
            title: "Fichas de Derivadas".to_string(),
            kind: ResourceKind::Pdf,
            subject_id: SubjectId(1),
            url: "/resources/derivadas.pdf".to_string(),
            description: "Exercícios resolvidos de derivadas".to_string(),
            upload_date: day(2024, 1, 8),
        },
        Resource {
            id: ResourceId(2),
            title: "Leis de Newton em 10 minutos".to_string(),
            kind: ResourceKind::Video,
            subject_id: SubjectId(3),
            url: "https://videos.escola.pt/newton".to_string(),
            description: "Revisão rápida para o teste".to_string(),
            upload_date: day(2024, 1, 17),
        },
        Resource {
            id: ResourceId(3),
            title: "Simulador de Reações".to_string(),
            kind: ResourceKind::Game,
            subject_id: SubjectId(4),
            url: "https://lab.escola.pt/reacoes".to_string(),
            description: "Laboratório virtual de reações químicas".to_string(),
            upload_date: day(2024, 1, 3),
        },
        Resource {
            id: ResourceId(4),
            title: "Gramática Online".to_string(),
            kind: ResourceKind::Link,
            subject_id: SubjectId(2),
            url: "https://gramatica.escola.pt".to_string(),
            description: "Consulta de regras gramaticais".to_string(),
            upload_date: day(2023, 12, 1),
        },
    ];

    Dataset {
        student,
        subjects,
        grades,
        events,
        payments,
        messages,
        notifications,
        resources,
    }
}

#[allow(clippy::too_many_arguments)]
fn notification(
    id: u32,
    title: &str,
    message: &str,
    kind: NotificationKind,
    category: Option<NotificationCategory>,
    date: NaiveDateTime,
    read: bool,
    action_url: Option<&str>,
) -> Notification {
    Notification {
        id: NotificationId(id),
        title: title.to_string(),
        message: message.to_string(),
        kind,
        category,
        date,
        read,
        action_url: action_url.map(str::to_string),
    }
}

/// Read a dataset from a JSON file without validating it.
pub fn read_dataset(path: &Path) -> Result<Dataset, StoreError> {
    let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset: Dataset = serde_json::from_str(&raw)?;
    debug!(
        path = %path.display(),
        subjects = dataset.subjects.len(),
        grades = dataset.grades.len(),
        "read dataset"
    );
    Ok(dataset)
}

/// Load and validate a dataset from a JSON file.
pub fn load_dataset(path: &Path) -> Result<Dataset, StoreError> {
    let dataset = read_dataset(path)?;
    validate_dataset(&dataset)?;
    Ok(dataset)
}

/// Parse and validate a dataset from a JSON string.
pub fn parse_dataset(raw: &str) -> Result<Dataset, StoreError> {
    let dataset: Dataset = serde_json::from_str(raw)?;
    validate_dataset(&dataset)?;
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_mock_dataset_is_valid() {
        validate_dataset(&mock_dataset()).expect("mock dataset must pass validation");
    }

    #[test]
    fn test_mock_dataset_has_unread_items() {
        let ds = mock_dataset();
        assert_eq!(ds.unread_messages(), 2);
        assert_eq!(ds.unread_notifications(), 5);
    }

    #[test]
    fn test_load_dataset_round_trips_mock() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string_pretty(&mock_dataset()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = load_dataset(file.path()).unwrap();
        assert_eq!(loaded, mock_dataset());
    }

    #[test]
    fn test_load_dataset_missing_file() {
        let err = load_dataset(Path::new("/nonexistent/dataset.json")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn test_read_dataset_leaves_validation_to_caller() {
        let mut ds = mock_dataset();
        ds.subjects[0].attendance = 140.0;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&ds).unwrap().as_bytes())
            .unwrap();

        assert_eq!(read_dataset(file.path()).unwrap(), ds);
        let err = load_dataset(file.path()).unwrap_err();
        assert!(matches!(err, StoreError::Invariant(_)));
    }

    #[test]
    fn test_parse_dataset_rejects_garbage() {
        let err = parse_dataset("{ not json").unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }

    #[test]
    fn test_parse_dataset_rejects_dangling_subject() {
        let mut ds = mock_dataset();
        ds.grades[0].subject_id = SubjectId(404);
        let raw = serde_json::to_string(&ds).unwrap();

        let err = parse_dataset(&raw).unwrap_err();
        assert!(matches!(err, StoreError::Invariant(_)));
    }
}
