//! Instruction processing

#![allow(deprecated)] // system_instruction deprecation - will migrate when solana_system_interface is stable

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    clock::Clock,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    sysvar::Sysvar,
};

use crate::{
    error::EscrowFactoryError,
    events,
    instruction::{EscrowCreationRequest, EscrowFactoryInstruction},
    state::{encode_player_id, seeds, Escrow, EscrowFactory},
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = EscrowFactoryInstruction::try_from_slice(instruction_data)
            .map_err(|_| EscrowFactoryError::InvalidInstructionData)?;

        match instruction {
            EscrowFactoryInstruction::InitializeFactory => {
                msg!("Instruction: InitializeFactory");
                Self::process_initialize_factory(program_id, accounts)
            }
            EscrowFactoryInstruction::CreateEscrow(request) => {
                msg!("Instruction: CreateEscrow");
                Self::process_create_escrow(program_id, accounts, request)
            }
        }
    }

    fn process_initialize_factory(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let factory_account = next_account_info(account_info_iter)?;
        let payer = next_account_info(account_info_iter)?;
        let system_program = next_account_info(account_info_iter)?;

        if !payer.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }

        let (factory_pda, factory_bump) =
            Pubkey::find_program_address(&[seeds::FACTORY_SEED], program_id);
        if factory_pda != *factory_account.key {
            return Err(EscrowFactoryError::InvalidPda.into());
        }
        if factory_account.data_len() > 0 || factory_account.owner == program_id {
            return Err(EscrowFactoryError::FactoryAlreadyInitialized.into());
        }

        let rent = Rent::get()?;
        let space = EscrowFactory::LEN;
        let lamports = rent.minimum_balance(space);
        let factory_seeds: &[&[u8]] = &[seeds::FACTORY_SEED, &[factory_bump]];

        if factory_account.lamports() == 0 {
            invoke_signed(
                &system_instruction::create_account(
                    payer.key,
                    factory_account.key,
                    lamports,
                    space as u64,
                    program_id,
                ),
                &[payer.clone(), factory_account.clone(), system_program.clone()],
                &[factory_seeds],
            )?;
        } else {
            // PDA was pre-funded; create_account would fail, so build the account in place
            let top_up = lamports.saturating_sub(factory_account.lamports());
            if top_up > 0 {
                invoke(
                    &system_instruction::transfer(payer.key, factory_account.key, top_up),
                    &[payer.clone(), factory_account.clone(), system_program.clone()],
                )?;
            }
            invoke_signed(
                &system_instruction::allocate(factory_account.key, space as u64),
                &[factory_account.clone(), system_program.clone()],
                &[factory_seeds],
            )?;
            invoke_signed(
                &system_instruction::assign(factory_account.key, program_id),
                &[factory_account.clone(), system_program.clone()],
                &[factory_seeds],
            )?;
        }

        let factory = EscrowFactory::new(*payer.key, factory_bump);
        factory.serialize(&mut &mut factory_account.data.borrow_mut()[..])?;

        events::emit_factory_initialized(factory_account.key, payer.key);
        Ok(())
    }

    fn process_create_escrow(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        request: EscrowCreationRequest,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let factory_account = next_account_info(account_info_iter)?;
        let escrow_account = next_account_info(account_info_iter)?;
        let payer = next_account_info(account_info_iter)?;
        let system_program = next_account_info(account_info_iter)?;

        let mut factory = Self::load_factory(program_id, factory_account)?;

        if !payer.is_signer || !escrow_account.is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        if escrow_account.lamports() > 0 || escrow_account.data_len() > 0 {
            return Err(EscrowFactoryError::EscrowAlreadyExists.into());
        }

        // Validate request
        for address in [&request.arbiter, &request.player1, &request.player2] {
            if *address == Pubkey::default() {
                return Err(EscrowFactoryError::InvalidAddress.into());
            }
        }
        let player1_id = encode_player_id(&request.player1_id)?;
        let player2_id = encode_player_id(&request.player2_id)?;

        let escrow_index = factory.escrow_count;
        factory.escrow_count = escrow_index
            .checked_add(1)
            .ok_or(EscrowFactoryError::EscrowCountOverflow)?;

        let clock = Clock::get()?;

        // Create escrow account
        let rent = Rent::get()?;
        let space = Escrow::LEN;
        let lamports = rent.minimum_balance(space);

        invoke(
            &system_instruction::create_account(
                payer.key,
                escrow_account.key,
                lamports,
                space as u64,
                program_id,
            ),
            &[payer.clone(), escrow_account.clone(), system_program.clone()],
        )?;

        let escrow = Escrow {
            discriminator: Escrow::DISCRIMINATOR,
            factory: *factory_account.key,
            arbiter: request.arbiter,
            player1_id,
            player1: request.player1,
            player1_bet_amount: request.player1_bet_amount,
            player2_id,
            player2: request.player2,
            player2_bet_amount: request.player2_bet_amount,
            escrow_index,
            created_at: clock.unix_timestamp,
        };
        escrow.serialize(&mut &mut escrow_account.data.borrow_mut()[..])?;
        factory.serialize(&mut &mut factory_account.data.borrow_mut()[..])?;

        events::emit_escrow_created(
            factory_account.key,
            &escrow.arbiter,
            &escrow.player1,
            &escrow.player2,
            escrow_account.key,
            escrow_index,
            escrow.player1_bet_amount,
            escrow.player2_bet_amount,
        );
        Ok(())
    }

    fn load_factory(
        program_id: &Pubkey,
        factory_account: &AccountInfo,
    ) -> Result<EscrowFactory, ProgramError> {
        let (factory_pda, _) = Pubkey::find_program_address(&[seeds::FACTORY_SEED], program_id);
        if factory_pda != *factory_account.key {
            return Err(EscrowFactoryError::InvalidPda.into());
        }
        if factory_account.data_len() == 0 {
            return Err(EscrowFactoryError::FactoryNotInitialized.into());
        }
        if factory_account.owner != program_id {
            return Err(EscrowFactoryError::InvalidAccountOwner.into());
        }

        let factory = EscrowFactory::try_from_slice(&factory_account.data.borrow())
            .map_err(|_| EscrowFactoryError::FactoryNotInitialized)?;
        if !factory.is_initialized() {
            return Err(EscrowFactoryError::FactoryNotInitialized.into());
        }
        Ok(factory)
    }
}
